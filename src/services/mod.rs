// Service exports
pub mod cache;
pub mod score;
pub mod store;

pub use cache::PreferenceCache;
pub use score::{average_rating, RatingAggregator};
pub use store::{
    ListingPatch, NewListing, NewPreference, NewReservation, NewReview, ReservationFilters,
    ReviewFilters, Store, StoreError,
};
