// Core engine exports
pub mod filters;
pub mod geo;
pub mod scoring;
pub mod search;

pub use filters::{address_contains, matches, validate, FilterError};
pub use geo::{bounding_box, is_within_bounding_box};
pub use scoring::compatibility_score;
pub use search::{SearchEngine, SearchOutcome};
