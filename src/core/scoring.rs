use crate::models::{Listing, TenantPreference};

/// Points awarded when any preference row matches the listing's housing type.
pub const TYPE_POINTS: u32 = 30;

/// Points awarded when any preference row's budget range covers the price.
pub const BUDGET_POINTS: u32 = 40;

/// Denominator of the heuristic. Deliberately 70, not 100: a third,
/// distance-based criterion was planned but never weighted, and the
/// ordering produced by the 70-point scale is load-bearing.
pub const TOTAL_POINTS: u32 = TYPE_POINTS + BUDGET_POINTS;

/// Compatibility between a tenant's stored preferences and one listing,
/// as an integer score in 0..=100.
///
/// An empty preference slice scores 0. This never fails; compatibility is
/// an enrichment, not a required field.
pub fn compatibility_score(preferences: &[TenantPreference], listing: &Listing) -> u8 {
    if preferences.is_empty() {
        return 0;
    }

    let mut earned = 0u32;

    if preferences
        .iter()
        .any(|p| p.housing_type == listing.housing_type)
    {
        earned += TYPE_POINTS;
    }

    if preferences
        .iter()
        .any(|p| p.budget_min <= listing.price && listing.price <= p.budget_max)
    {
        earned += BUDGET_POINTS;
    }

    ((earned as f64 / TOTAL_POINTS as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HousingType, ListingStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_listing(price: i32, housing_type: HousingType) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            title: "Studio meublé".to_string(),
            pitch: None,
            address: "3 place Bellecour, Lyon".to_string(),
            latitude: 45.7578,
            longitude: 4.8320,
            price,
            housing_type,
            status: ListingStatus::Available,
            score: 0.0,
            photos: vec![],
            created_at: Utc::now(),
        }
    }

    fn create_preference(housing_type: HousingType, budget_min: i32, budget_max: i32) -> TenantPreference {
        TenantPreference {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            housing_type,
            budget_min,
            budget_max,
            radius_km: 10,
            notes: None,
        }
    }

    #[test]
    fn test_empty_preferences_score_zero() {
        let listing = create_test_listing(500, HousingType::Studio);
        assert_eq!(compatibility_score(&[], &listing), 0);
    }

    #[test]
    fn test_full_match_scores_100() {
        let listing = create_test_listing(500, HousingType::Studio);
        let prefs = vec![create_preference(HousingType::Studio, 400, 600)];
        assert_eq!(compatibility_score(&prefs, &listing), 100);
    }

    #[test]
    fn test_type_only_scores_43() {
        // round(30 / 70 * 100) = 43
        let listing = create_test_listing(1000, HousingType::Studio);
        let prefs = vec![create_preference(HousingType::Studio, 400, 600)];
        assert_eq!(compatibility_score(&prefs, &listing), 43);
    }

    #[test]
    fn test_budget_only_scores_57() {
        // round(40 / 70 * 100) = 57
        let listing = create_test_listing(500, HousingType::Apartment);
        let prefs = vec![create_preference(HousingType::Studio, 400, 600)];
        assert_eq!(compatibility_score(&prefs, &listing), 57);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let listing = create_test_listing(1500, HousingType::House);
        let prefs = vec![create_preference(HousingType::Studio, 400, 600)];
        assert_eq!(compatibility_score(&prefs, &listing), 0);
    }

    #[test]
    fn test_budget_bounds_are_inclusive() {
        let prefs = vec![create_preference(HousingType::Apartment, 400, 600)];

        let at_min = create_test_listing(400, HousingType::House);
        assert_eq!(compatibility_score(&prefs, &at_min), 57);

        let at_max = create_test_listing(600, HousingType::House);
        assert_eq!(compatibility_score(&prefs, &at_max), 57);

        let above = create_test_listing(601, HousingType::House);
        assert_eq!(compatibility_score(&prefs, &above), 0);
    }

    #[test]
    fn test_any_preference_row_can_satisfy_a_criterion() {
        // Type matched by one row, budget by another
        let listing = create_test_listing(800, HousingType::Studio);
        let prefs = vec![
            create_preference(HousingType::Studio, 300, 500),
            create_preference(HousingType::House, 700, 900),
        ];
        assert_eq!(compatibility_score(&prefs, &listing), 100);
    }
}
