use crate::core::geo::{bounding_box, is_within_bounding_box};
use crate::models::{Listing, ListingFilters};
use thiserror::Error;

/// Validation failures for a filter set. These are caught at the API
/// boundary before any query runs.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("prix_min ({0}) cannot be greater than prix_max ({1})")]
    PriceRange(i32, i32),
    #[error("latitude must be within [-90, 90], got {0}")]
    Latitude(f64),
    #[error("longitude must be within [-180, 180], got {0}")]
    Longitude(f64),
    #[error("radius must be within (0, 100] km, got {0}")]
    Radius(f64),
    #[error("score_min must be within [0, 5], got {0}")]
    ScoreRange(f64),
}

/// Reject out-of-range filter values before the filter set is used.
pub fn validate(filters: &ListingFilters) -> Result<(), FilterError> {
    if let (Some(min), Some(max)) = (filters.price_min, filters.price_max) {
        if min > max {
            return Err(FilterError::PriceRange(min, max));
        }
    }
    if let Some(score_min) = filters.score_min {
        if !(0.0..=5.0).contains(&score_min) {
            return Err(FilterError::ScoreRange(score_min));
        }
    }
    if let Some(geo) = filters.geo {
        if !(-90.0..=90.0).contains(&geo.lat) {
            return Err(FilterError::Latitude(geo.lat));
        }
        if !(-180.0..=180.0).contains(&geo.lng) {
            return Err(FilterError::Longitude(geo.lng));
        }
        if !(geo.radius_km > 0.0 && geo.radius_km <= 100.0) {
            return Err(FilterError::Radius(geo.radius_km));
        }
    }
    Ok(())
}

/// Check a listing against a filter set.
///
/// Every present field is a hard AND constraint. Checks are pure and
/// short-circuit on the first failing predicate.
#[inline]
pub fn matches(listing: &Listing, filters: &ListingFilters) -> bool {
    if let Some(housing_type) = filters.housing_type {
        if listing.housing_type != housing_type {
            return false;
        }
    }

    if let Some(price_min) = filters.price_min {
        if listing.price < price_min {
            return false;
        }
    }

    if let Some(price_max) = filters.price_max {
        if listing.price > price_max {
            return false;
        }
    }

    if let Some(status) = filters.status {
        if listing.status != status {
            return false;
        }
    }

    if let Some(available) = filters.available {
        if listing.is_available() != available {
            return false;
        }
    }

    if let Some(score_min) = filters.score_min {
        if listing.score < score_min {
            return false;
        }
    }

    if let Some(geo) = filters.geo {
        let bbox = bounding_box(geo.lat, geo.lng, geo.radius_km);
        if !is_within_bounding_box(listing.latitude, listing.longitude, &bbox) {
            return false;
        }
    }

    true
}

/// Case-insensitive address substring match. Deliberately outside the
/// structured filter set.
pub fn address_contains(listing: &Listing, needle: &str) -> bool {
    listing
        .address
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoConstraint, HousingType, ListingStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_listing(price: i32, housing_type: HousingType, status: ListingStatus) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            title: "T2 lumineux proche campus".to_string(),
            pitch: None,
            address: "12 rue de la République, Lyon".to_string(),
            latitude: 45.7640,
            longitude: 4.8357,
            price,
            housing_type,
            status,
            score: 4.2,
            photos: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available);
        assert!(matches(&listing, &ListingFilters::default()));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available);

        let at_min = ListingFilters { price_min: Some(500), ..Default::default() };
        assert!(matches(&listing, &at_min));

        let above_min = ListingFilters { price_min: Some(501), ..Default::default() };
        assert!(!matches(&listing, &above_min));

        let at_max = ListingFilters { price_max: Some(500), ..Default::default() };
        assert!(matches(&listing, &at_max));

        let below_max = ListingFilters { price_max: Some(499), ..Default::default() };
        assert!(!matches(&listing, &below_max));
    }

    #[test]
    fn test_housing_type_is_exact() {
        let listing = create_test_listing(500, HousingType::Apartment, ListingStatus::Available);

        let same = ListingFilters { housing_type: Some(HousingType::Apartment), ..Default::default() };
        assert!(matches(&listing, &same));

        let other = ListingFilters { housing_type: Some(HousingType::Studio), ..Default::default() };
        assert!(!matches(&listing, &other));
    }

    #[test]
    fn test_status_and_derived_availability() {
        let reserved = create_test_listing(500, HousingType::Studio, ListingStatus::Reserved);

        let wants_available = ListingFilters { status: Some(ListingStatus::Available), ..Default::default() };
        assert!(!matches(&reserved, &wants_available));

        let not_available = ListingFilters { available: Some(false), ..Default::default() };
        assert!(matches(&reserved, &not_available));

        let available = ListingFilters { available: Some(true), ..Default::default() };
        assert!(!matches(&reserved, &available));
    }

    #[test]
    fn test_score_floor_is_inclusive() {
        let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available);

        let at_score = ListingFilters { score_min: Some(4.2), ..Default::default() };
        assert!(matches(&listing, &at_score));

        let above = ListingFilters { score_min: Some(4.3), ..Default::default() };
        assert!(!matches(&listing, &above));
    }

    #[test]
    fn test_geo_constraint_delegates_to_bounding_box() {
        let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available);

        // Lyon city center, listing is inside
        let nearby = ListingFilters {
            geo: Some(GeoConstraint { lat: 45.75, lng: 4.85, radius_km: 10.0 }),
            ..Default::default()
        };
        assert!(matches(&listing, &nearby));

        // Paris, listing is far outside
        let far = ListingFilters {
            geo: Some(GeoConstraint { lat: 48.8566, lng: 2.3522, radius_km: 10.0 }),
            ..Default::default()
        };
        assert!(!matches(&listing, &far));
    }

    #[test]
    fn test_validate_rejects_inverted_price_range() {
        let filters = ListingFilters { price_min: Some(900), price_max: Some(400), ..Default::default() };
        assert!(matches!(validate(&filters), Err(FilterError::PriceRange(900, 400))));
    }

    #[test]
    fn test_validate_rejects_bad_geo() {
        let bad_lat = ListingFilters {
            geo: Some(GeoConstraint { lat: 95.0, lng: 0.0, radius_km: 10.0 }),
            ..Default::default()
        };
        assert!(matches!(validate(&bad_lat), Err(FilterError::Latitude(_))));

        let bad_radius = ListingFilters {
            geo: Some(GeoConstraint { lat: 45.0, lng: 4.8, radius_km: 0.0 }),
            ..Default::default()
        };
        assert!(matches!(validate(&bad_radius), Err(FilterError::Radius(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let filters = ListingFilters { score_min: Some(7.5), ..Default::default() };
        assert!(matches!(validate(&filters), Err(FilterError::ScoreRange(_))));
    }

    #[test]
    fn test_address_contains_is_case_insensitive() {
        let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available);
        assert!(address_contains(&listing, "république"));
        assert!(address_contains(&listing, "LYON"));
        assert!(!address_contains(&listing, "Marseille"));
    }
}
