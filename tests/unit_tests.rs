// Unit tests for the Rives search engine

use chrono::{Duration, Utc};
use rives_algo::core::{
    filters::{matches, validate},
    geo::{bounding_box, is_within_bounding_box},
    scoring::compatibility_score,
};
use rives_algo::models::{
    GeoConstraint, HousingType, Listing, ListingFilters, ListingStatus, TenantPreference,
};
use uuid::Uuid;

fn create_test_listing(
    price: i32,
    housing_type: HousingType,
    status: ListingStatus,
    lat: f64,
    lng: f64,
) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        landlord_id: Uuid::new_v4(),
        title: format!("{housing_type:?} à {price} EUR"),
        pitch: Some("Proche des transports".to_string()),
        address: "8 avenue Berthelot, Lyon".to_string(),
        latitude: lat,
        longitude: lng,
        price,
        housing_type,
        status,
        score: 3.8,
        photos: vec!["https://cdn.example.test/p1.jpg".to_string()],
        created_at: Utc::now() - Duration::days(2),
    }
}

fn create_test_preference(
    housing_type: HousingType,
    budget_min: i32,
    budget_max: i32,
) -> TenantPreference {
    TenantPreference {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        housing_type,
        budget_min,
        budget_max,
        radius_km: 20,
        notes: None,
    }
}

#[test]
fn test_bounding_box_center_is_inside() {
    let bbox = bounding_box(45.7640, 4.8357, 1.0);
    assert!(is_within_bounding_box(45.7640, 4.8357, &bbox));
}

#[test]
fn test_bounding_box_latitude_span() {
    // 2 * 10km / 111.32 km per degree ~= 0.1797 degrees
    let bbox = bounding_box(48.8566, 2.3522, 10.0);
    let span = bbox.max_lat - bbox.min_lat;
    assert!((span - 0.1797).abs() < 0.001, "span was {span}");
}

#[test]
fn test_bounding_box_survives_the_poles() {
    let bbox = bounding_box(89.9999999, 0.0, 10.0);
    assert!(bbox.min_lng.is_finite());
    assert!(bbox.max_lng.is_finite());
}

#[test]
fn test_empty_filters_match_any_listing() {
    let listings = [
        create_test_listing(350, HousingType::Studio, ListingStatus::Available, 45.76, 4.83),
        create_test_listing(1200, HousingType::House, ListingStatus::Reserved, 48.85, 2.35),
        create_test_listing(620, HousingType::Apartment, ListingStatus::Unavailable, 43.30, 5.37),
    ];
    for listing in &listings {
        assert!(matches(listing, &ListingFilters::default()));
    }
}

#[test]
fn test_price_min_boundary_is_inclusive() {
    let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available, 45.76, 4.83);

    let exact = ListingFilters { price_min: Some(500), ..Default::default() };
    assert!(matches(&listing, &exact));

    let one_above = ListingFilters { price_min: Some(501), ..Default::default() };
    assert!(!matches(&listing, &one_above));
}

#[test]
fn test_combined_filters_are_all_required() {
    let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available, 45.76, 4.83);

    let all_pass = ListingFilters {
        housing_type: Some(HousingType::Studio),
        price_min: Some(400),
        price_max: Some(600),
        score_min: Some(3.0),
        geo: Some(GeoConstraint { lat: 45.75, lng: 4.85, radius_km: 10.0 }),
        ..Default::default()
    };
    assert!(matches(&listing, &all_pass));

    let one_fails = ListingFilters {
        price_max: Some(499),
        ..all_pass
    };
    assert!(!matches(&listing, &one_fails));
}

#[test]
fn test_filter_validation_rejects_bad_input() {
    let inverted = ListingFilters {
        price_min: Some(800),
        price_max: Some(200),
        ..Default::default()
    };
    assert!(validate(&inverted).is_err());

    let bad_longitude = ListingFilters {
        geo: Some(GeoConstraint { lat: 45.0, lng: 200.0, radius_km: 10.0 }),
        ..Default::default()
    };
    assert!(validate(&bad_longitude).is_err());
}

#[test]
fn test_compatibility_reference_values() {
    let prefs = vec![create_test_preference(HousingType::Studio, 400, 600)];

    let both = create_test_listing(500, HousingType::Studio, ListingStatus::Available, 45.76, 4.83);
    assert_eq!(compatibility_score(&prefs, &both), 100);

    let type_only = create_test_listing(1000, HousingType::Studio, ListingStatus::Available, 45.76, 4.83);
    assert_eq!(compatibility_score(&prefs, &type_only), 43);

    let budget_only = create_test_listing(500, HousingType::Apartment, ListingStatus::Available, 45.76, 4.83);
    assert_eq!(compatibility_score(&prefs, &budget_only), 57);

    let neither = create_test_listing(1000, HousingType::House, ListingStatus::Available, 45.76, 4.83);
    assert_eq!(compatibility_score(&prefs, &neither), 0);
}

#[test]
fn test_compatibility_with_no_preferences() {
    let listing = create_test_listing(500, HousingType::Studio, ListingStatus::Available, 45.76, 4.83);
    assert_eq!(compatibility_score(&[], &listing), 0);
}
