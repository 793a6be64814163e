use crate::services::store::{Store, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Mean of review ratings, rounded to one decimal. No reviews yields 0.
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().map(|r| *r as i32).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Keeps listing scores in sync with their reviews.
///
/// Review creation emits a "review recorded" event handled here, rather
/// than burying the recompute in the handler. Searches observe the new
/// score eventually; no transaction spans review creation and search.
pub struct RatingAggregator {
    store: Arc<Store>,
}

impl RatingAggregator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Recompute and persist the mean rating of a listing.
    pub async fn review_recorded(&self, listing_id: Uuid) -> Result<f64, StoreError> {
        let ratings = self.store.fetch_ratings(listing_id).await?;
        let score = average_rating(&ratings);
        self.store.update_listing_score(listing_id, score).await?;

        tracing::debug!(
            "Recomputed score for listing {} from {} ratings: {}",
            listing_id,
            ratings.len(),
            score
        );

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ratings_means_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_single_rating() {
        assert_eq!(average_rating(&[4]), 4.0);
    }

    #[test]
    fn test_mean_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[4, 5]), 4.5);
        // 11 / 3 = 3.666... -> 3.7
        assert_eq!(average_rating(&[3, 4, 4]), 3.7);
        // 7 / 3 = 2.333... -> 2.3
        assert_eq!(average_rating(&[1, 2, 4]), 2.3);
    }

    #[test]
    fn test_extremes_stay_in_range() {
        assert_eq!(average_rating(&[1, 1, 1]), 1.0);
        assert_eq!(average_rating(&[5, 5, 5, 5]), 5.0);
    }
}
