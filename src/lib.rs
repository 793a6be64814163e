//! Rives Algo - Listing search and ranking service for the Rives
//! student-housing marketplace
//!
//! The core of this library is a small, pure search engine: a geographic
//! bounding-box filter, a criteria matcher, a compatibility scorer and a
//! search orchestrator that filters, scores, sorts and paginates candidate
//! listings. Around it sit the HTTP surface and the PostgreSQL store.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    bounding_box, compatibility_score, is_within_bounding_box, SearchEngine, SearchOutcome,
};
pub use crate::models::{
    HousingType, Listing, ListingFilters, ListingStatus, ScoredListing, SortKey, TenantPreference,
};
