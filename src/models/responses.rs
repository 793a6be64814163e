use crate::models::domain::{Landlord, Listing, Review, ScoredListing};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pagination block returned with every list endpoint. The field casing is
/// part of the wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let total_pages = if limit == 0 || total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self { page, limit, total, total_pages }
    }
}

/// A listing as it goes over the wire: the domain row plus the derived
/// availability boolean and, when a tenant context was supplied, the
/// ephemeral compatibility score.
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    #[serde(flatten)]
    pub listing: Listing,
    pub disponible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<u8>,
}

impl From<ScoredListing> for ListingData {
    fn from(scored: ScoredListing) -> Self {
        Self {
            disponible: scored.listing.is_available(),
            compatibility_score: scored.compatibility,
            listing: scored.listing,
        }
    }
}

impl From<Listing> for ListingData {
    fn from(listing: Listing) -> Self {
        Self {
            disponible: listing.is_available(),
            compatibility_score: None,
            listing,
        }
    }
}

/// Which filter groups were active for a search, echoed back in the stats.
#[derive(Debug, Clone, Serialize)]
pub struct FiltersApplied {
    pub type_logement: bool,
    pub prix_range: bool,
    pub location: bool,
    pub score_min: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub total_results: usize,
    pub filters_applied: FiltersApplied,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<ListingData>,
    pub stats: SearchStats,
    pub pagination: Pagination,
}

/// Generic paged list response.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Full listing view for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub disponible: bool,
    pub bailleur: Option<Landlord>,
    pub avis: Vec<Review>,
    pub note_moyenne: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_score: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
