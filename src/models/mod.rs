// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, GeoConstraint, HousingType, Landlord, Listing, ListingFilters, ListingStatus,
    Reservation, ReservationStatus, Review, ScoredListing, SortKey, Tenant, TenantPreference,
};
pub use requests::{
    CreateListingRequest, CreateReservationRequest, CreateReviewRequest, ListingDetailQuery,
    ListingQueryParams, PreferenceQuery, ReservationListParams, ReviewListParams, SearchParams,
    UpdateListingRequest, UpdateReservationRequest, UpsertPreferencesRequest,
};
pub use responses::{
    CreatedResponse, DataResponse, ErrorResponse, FiltersApplied, HealthResponse, ListingData,
    ListingDetail, MessageResponse, Paged, Pagination, SearchResponse, SearchStats,
};
