use crate::models::{CreateReviewRequest, CreatedResponse, Paged, Pagination, ReviewListParams};
use crate::routes::{page_window, ApiError, AppState};
use crate::services::{NewReview, ReviewFilters};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure review routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/avis", web::get().to(list_reviews))
        .route("/avis", web::post().to(create_review));
}

/// List reviews with filters and pagination
///
/// GET /api/avis?logement_id&locataire_id&bailleur_id&note_min&note_max&page&limit
async fn list_reviews(
    state: web::Data<AppState>,
    query: web::Query<ReviewListParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let (page, limit) = page_window(params.page, params.limit, &state.limits);

    if let (Some(min), Some(max)) = (params.rating_min, params.rating_max) {
        if min > max {
            return Err(ApiError::Validation(format!(
                "note_min ({min}) cannot be greater than note_max ({max})"
            )));
        }
    }

    let review_filters = ReviewFilters {
        listing_id: params.listing_id,
        tenant_id: params.tenant_id,
        landlord_id: params.landlord_id,
        rating_min: params.rating_min,
        rating_max: params.rating_max,
    };

    let (reviews, total) = state.store.list_reviews(&review_filters, page, limit).await?;

    Ok(HttpResponse::Ok().json(Paged {
        success: true,
        data: reviews,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Create a review and recompute the listing's score.
///
/// POST /api/avis
///
/// Exactly one of `locataire_id` / `bailleur_id` identifies the reviewer,
/// and each reviewer gets one review per listing. The score recompute is a
/// side effect owned by this flow, handled by the rating aggregator.
async fn create_review(
    state: web::Data<AppState>,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    if req.tenant_id.is_some() == req.landlord_id.is_some() {
        return Err(ApiError::Validation(
            "exactly one of locataire_id or bailleur_id must be set".to_string(),
        ));
    }

    state
        .store
        .fetch_listing(req.listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("listing {} not found", req.listing_id)))?;

    if let Some(tenant_id) = req.tenant_id {
        state
            .store
            .fetch_tenant(tenant_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| ApiError::NotFound("tenant not found or inactive".to_string()))?;

        if state
            .store
            .has_review_from_tenant(req.listing_id, tenant_id)
            .await?
        {
            return Err(ApiError::Conflict(
                "a review already exists for this listing".to_string(),
            ));
        }
    }

    if let Some(landlord_id) = req.landlord_id {
        state
            .store
            .fetch_landlord(landlord_id)
            .await?
            .filter(|l| l.is_active)
            .ok_or_else(|| ApiError::NotFound("landlord not found or inactive".to_string()))?;

        if state
            .store
            .has_review_from_landlord(req.listing_id, landlord_id)
            .await?
        {
            return Err(ApiError::Conflict(
                "a review already exists for this listing".to_string(),
            ));
        }
    }

    let review = state
        .store
        .insert_review(NewReview {
            tenant_id: req.tenant_id,
            landlord_id: req.landlord_id,
            listing_id: req.listing_id,
            rating: req.rating,
            comment: req
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        })
        .await?;

    let score = state.aggregator.review_recorded(review.listing_id).await?;
    tracing::info!(
        "review {} recorded for listing {}, score is now {}",
        review.id,
        review.listing_id,
        score
    );

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        data: review,
        message: "review created".to_string(),
    }))
}
