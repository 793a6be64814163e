use crate::core::{filters, scoring::compatibility_score};
use crate::models::{Listing, ListingFilters, ScoredListing, SortKey, TenantPreference};

/// Result of a search: one page of survivors plus the total survivor count
/// (before pagination), so callers can derive the page count.
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<ScoredListing>,
    pub total: usize,
}

/// Search orchestrator.
///
/// # Pipeline
/// 1. Apply the criteria matcher to every candidate
/// 2. Attach an ephemeral compatibility score per survivor when a tenant
///    context is supplied
/// 3. Sort by the requested key (stable, so ties keep prior order)
/// 4. Paginate
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the full pipeline over an in-memory candidate set.
    ///
    /// `page` is 1-indexed. Sorting by compatibility without tenant
    /// preferences leaves the prior order untouched; rejecting that
    /// combination is the HTTP boundary's job.
    pub fn search(
        &self,
        candidates: Vec<Listing>,
        filters: &ListingFilters,
        sort: SortKey,
        preferences: Option<&[TenantPreference]>,
        page: usize,
        page_size: usize,
    ) -> SearchOutcome {
        let mut survivors: Vec<ScoredListing> = candidates
            .into_iter()
            .filter(|listing| filters::matches(listing, filters))
            .map(|listing| ScoredListing {
                compatibility: preferences.map(|prefs| compatibility_score(prefs, &listing)),
                listing,
            })
            .collect();

        sort_survivors(&mut survivors, sort);

        let total = survivors.len();
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let results = survivors.into_iter().skip(offset).take(page_size).collect();

        SearchOutcome { results, total }
    }
}

fn sort_survivors(survivors: &mut [ScoredListing], sort: SortKey) {
    match sort {
        SortKey::Newest => {
            survivors.sort_by(|a, b| b.listing.created_at.cmp(&a.listing.created_at));
        }
        SortKey::Score => {
            survivors.sort_by(|a, b| {
                b.listing
                    .score
                    .partial_cmp(&a.listing.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortKey::PriceAsc => {
            survivors.sort_by(|a, b| a.listing.price.cmp(&b.listing.price));
        }
        SortKey::PriceDesc => {
            survivors.sort_by(|a, b| b.listing.price.cmp(&a.listing.price));
        }
        SortKey::Compatibility => {
            // Scores are all None without a tenant context; the stable sort
            // then leaves the ordering as-is.
            survivors.sort_by(|a, b| b.compatibility.unwrap_or(0).cmp(&a.compatibility.unwrap_or(0)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HousingType, ListingStatus};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn create_listing(price: i32, housing_type: HousingType, age_days: i64) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            title: format!("Logement à {price}"),
            pitch: None,
            address: "Villeurbanne".to_string(),
            latitude: 45.77,
            longitude: 4.88,
            price,
            housing_type,
            status: ListingStatus::Available,
            score: 0.0,
            photos: vec![],
            created_at: Utc::now() - Duration::days(age_days),
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
    fn test_price_sorting() {
        let engine = SearchEngine::new();
        let candidates = vec![
            create_listing(500, HousingType::Studio, 0),
            create_listing(300, HousingType::Studio, 1),
            create_listing(900, HousingType::Studio, 2),
        ];

        let asc = engine.search(
            candidates.clone(),
            &ListingFilters::default(),
            SortKey::PriceAsc,
            None,
            1,
            10,
        );
        let prices: Vec<i32> = asc.results.iter().map(|r| r.listing.price).collect();
        assert_eq!(prices, vec![300, 500, 900]);

        let desc = engine.search(
            candidates,
            &ListingFilters::default(),
            SortKey::PriceDesc,
            None,
            1,
            10,
        );
        let prices: Vec<i32> = desc.results.iter().map(|r| r.listing.price).collect();
        assert_eq!(prices, vec![900, 500, 300]);
    }

    #[test]
    fn test_newest_is_default_ordering() {
        let engine = SearchEngine::new();
        let candidates = vec![
            create_listing(500, HousingType::Studio, 5),
            create_listing(600, HousingType::Studio, 1),
            create_listing(700, HousingType::Studio, 3),
        ];

        let outcome = engine.search(
            candidates,
            &ListingFilters::default(),
            SortKey::Newest,
            None,
            1,
            10,
        );
        let prices: Vec<i32> = outcome.results.iter().map(|r| r.listing.price).collect();
        assert_eq!(prices, vec![600, 700, 500]);
    }

    #[test]
    fn test_pagination_window() {
        let engine = SearchEngine::new();
        let candidates: Vec<Listing> = (0..25)
            .map(|i| create_listing(300 + i, HousingType::Studio, i as i64))
            .collect();

        let page3 = engine.search(
            candidates.clone(),
            &ListingFilters::default(),
            SortKey::PriceAsc,
            None,
            3,
            10,
        );
        assert_eq!(page3.results.len(), 5);
        assert_eq!(page3.total, 25);

        let past_the_end = engine.search(
            candidates,
            &ListingFilters::default(),
            SortKey::PriceAsc,
            None,
            4,
            10,
        );
        assert!(past_the_end.results.is_empty());
        assert_eq!(past_the_end.total, 25);
    }

    #[test]
    fn test_total_counts_survivors_not_page() {
        let engine = SearchEngine::new();
        let mut candidates: Vec<Listing> = (0..8)
            .map(|i| create_listing(400 + i * 10, HousingType::Studio, 0))
            .collect();
        candidates.push(create_listing(2000, HousingType::House, 0));

        let filters = ListingFilters {
            housing_type: Some(HousingType::Studio),
            ..Default::default()
        };
        let outcome = engine.search(candidates, &filters, SortKey::PriceAsc, None, 1, 3);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.total, 8);
    }

    #[test]
    fn test_compatibility_ranking() {
        let engine = SearchEngine::new();
        let prefs = vec![create_preference(HousingType::Studio, 400, 600)];

        let full_match = create_listing(500, HousingType::Studio, 0);
        let budget_only = create_listing(500, HousingType::Apartment, 0);
        let type_only = create_listing(1000, HousingType::Studio, 0);
        let candidates = vec![type_only.clone(), budget_only.clone(), full_match.clone()];

        let outcome = engine.search(
            candidates,
            &ListingFilters::default(),
            SortKey::Compatibility,
            Some(&prefs),
            1,
            10,
        );

        let scores: Vec<u8> = outcome
            .results
            .iter()
            .map(|r| r.compatibility.unwrap())
            .collect();
        assert_eq!(scores, vec![100, 57, 43]);
        assert_eq!(outcome.results[0].listing.id, full_match.id);
        assert_eq!(outcome.results[1].listing.id, budget_only.id);
        assert_eq!(outcome.results[2].listing.id, type_only.id);
    }

    #[test]
    fn test_compatibility_without_tenant_context_retains_order() {
        let engine = SearchEngine::new();
        let a = create_listing(500, HousingType::Studio, 0);
        let b = create_listing(900, HousingType::House, 0);
        let c = create_listing(300, HousingType::Apartment, 0);
        let ids: Vec<Uuid> = vec![a.id, b.id, c.id];

        let outcome = engine.search(
            vec![a, b, c],
            &ListingFilters::default(),
            SortKey::Compatibility,
            None,
            1,
            10,
        );
        let got: Vec<Uuid> = outcome.results.iter().map(|r| r.listing.id).collect();
        assert_eq!(got, ids);
        assert!(outcome.results.iter().all(|r| r.compatibility.is_none()));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let engine = SearchEngine::new();
        let candidates: Vec<Listing> = (0..10)
            .map(|i| create_listing(400 + i * 100, HousingType::Studio, 0))
            .collect();
        let filters = ListingFilters {
            price_max: Some(800),
            ..Default::default()
        };

        let first = engine.search(candidates, &filters, SortKey::PriceAsc, None, 1, 100);
        let survivors: Vec<Listing> = first.results.iter().map(|r| r.listing.clone()).collect();
        let second = engine.search(survivors, &filters, SortKey::PriceAsc, None, 1, 100);

        assert_eq!(first.total, second.total);
        let first_ids: Vec<Uuid> = first.results.iter().map(|r| r.listing.id).collect();
        let second_ids: Vec<Uuid> = second.results.iter().map(|r| r.listing.id).collect();
        assert_eq!(first_ids, second_ids);
    }
}
