use crate::core::scoring;
use crate::models::{
    CreateListingRequest, CreatedResponse, DataResponse, GeoConstraint, ListingData,
    ListingDetail, ListingDetailQuery, ListingFilters, ListingQueryParams, ListingStatus,
    MessageResponse, Paged, Pagination, SortKey, UpdateListingRequest,
};
use crate::routes::{load_preferences, page_window, ApiError, AppState};
use crate::services::{average_rating, ListingPatch, NewListing};
use crate::core::filters;
use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

/// Configure listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/logements", web::get().to(list_listings))
        .route("/logements", web::post().to(create_listing))
        .route("/logements/{id}", web::get().to(get_listing))
        .route("/logements/{id}", web::put().to(update_listing))
        .route("/logements/{id}", web::delete().to(delete_listing));
}

/// Listing search without the forced availability constraint: status and
/// the availability boolean can be filtered explicitly.
///
/// GET /api/logements
async fn list_listings(
    state: web::Data<AppState>,
    query: web::Query<ListingQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let (page, limit) = page_window(params.page, params.limit, &state.limits);

    let sort = match params.sort_by.as_deref() {
        None => SortKey::Newest,
        Some(raw) => raw.parse::<SortKey>().map_err(ApiError::Validation)?,
    };
    if sort == SortKey::Compatibility && params.tenant_id.is_none() {
        return Err(ApiError::Validation(
            "sort_by=compatibility requires locataire_id".to_string(),
        ));
    }

    let housing_type = params
        .housing_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::Validation)?;
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ListingStatus>)
        .transpose()
        .map_err(ApiError::Validation)?;

    let geo = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some(GeoConstraint {
            lat,
            lng,
            radius_km: params.radius.unwrap_or(state.limits.default_radius_km),
        }),
        (None, None) => None,
        _ => {
            return Err(ApiError::Validation(
                "lat and lng must be provided together".to_string(),
            ))
        }
    };

    let listing_filters = ListingFilters {
        housing_type,
        price_min: params.price_min,
        price_max: params.price_max,
        status,
        available: params.available,
        score_min: params.score_min,
        geo,
    };
    filters::validate(&listing_filters).map_err(|e| ApiError::Validation(e.to_string()))?;

    let preferences = match params.tenant_id {
        Some(tenant_id) => Some(load_preferences(&state, tenant_id).await?),
        None => None,
    };

    let candidates = state
        .store
        .fetch_candidates(&listing_filters, state.limits.max_candidates)
        .await?;

    let outcome = state.engine.search(
        candidates,
        &listing_filters,
        sort,
        preferences.as_ref().map(|p| p.as_slice()),
        page,
        limit,
    );

    let data: Vec<ListingData> = outcome.results.into_iter().map(ListingData::from).collect();

    Ok(HttpResponse::Ok().json(Paged {
        success: true,
        data,
        pagination: Pagination::new(page, limit, outcome.total),
    }))
}

/// Create a listing
///
/// POST /api/logements
async fn create_listing(
    state: web::Data<AppState>,
    body: web::Json<CreateListingRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("titre cannot be empty".to_string()));
    }
    let address = req.address.trim();
    if address.is_empty() {
        return Err(ApiError::Validation("adresse cannot be empty".to_string()));
    }

    let housing_type = req
        .housing_type
        .parse()
        .map_err(ApiError::Validation)?;
    let status = req
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::Validation)?
        .unwrap_or(ListingStatus::Available);

    if let Some(lat) = req.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::Validation(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
    }
    if let Some(lng) = req.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ApiError::Validation(format!(
                "longitude must be within [-180, 180], got {lng}"
            )));
        }
    }

    let landlord = state
        .store
        .fetch_landlord(req.landlord_id)
        .await?
        .filter(|l| l.is_active)
        .ok_or_else(|| ApiError::NotFound("landlord not found or inactive".to_string()))?;

    let listing = state
        .store
        .insert_listing(NewListing {
            landlord_id: landlord.id,
            title: title.to_string(),
            pitch: normalize_optional_text(req.pitch),
            address: address.to_string(),
            latitude: req.latitude.unwrap_or(0.0),
            longitude: req.longitude.unwrap_or(0.0),
            price: req.price,
            housing_type,
            status,
            photos: req.photos,
        })
        .await?;

    tracing::info!("listing {} created by landlord {}", listing.id, landlord.id);

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        data: ListingData::from(listing),
        message: "listing created".to_string(),
    }))
}

/// Full listing detail: the row, its landlord, its reviews and the mean
/// rating, plus the compatibility score when a tenant context is supplied.
///
/// GET /api/logements/{id}
async fn get_listing(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ListingDetailQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let listing = state
        .store
        .fetch_listing(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("listing {id} not found")))?;

    let landlord = state.store.fetch_landlord(listing.landlord_id).await?;
    let reviews = state.store.fetch_listing_reviews(id).await?;
    let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();
    let note_moyenne = average_rating(&ratings);

    let compatibility_score = match query.tenant_id {
        Some(tenant_id) => {
            let preferences = load_preferences(&state, tenant_id).await?;
            Some(scoring::compatibility_score(&preferences, &listing))
        }
        None => None,
    };

    let detail = ListingDetail {
        disponible: listing.is_available(),
        listing,
        bailleur: landlord,
        avis: reviews,
        note_moyenne,
        compatibility_score,
    };

    Ok(HttpResponse::Ok().json(DataResponse {
        success: true,
        data: detail,
    }))
}

/// Partial update of a listing
///
/// PUT /api/logements/{id}
async fn update_listing(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateListingRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let req = body.into_inner();

    let title = match req.title {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::Validation("titre cannot be empty".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };
    let address = match req.address {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::Validation("adresse cannot be empty".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };

    if let Some(price) = req.price {
        if price <= 0 {
            return Err(ApiError::Validation("prix must be greater than 0".to_string()));
        }
    }
    if let Some(lat) = req.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::Validation(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
    }
    if let Some(lng) = req.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ApiError::Validation(format!(
                "longitude must be within [-180, 180], got {lng}"
            )));
        }
    }

    let housing_type = req
        .housing_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::Validation)?;
    let status = req
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::Validation)?;

    let patch = ListingPatch {
        title,
        pitch: req.pitch.map(|p| p.trim().to_string()),
        address,
        latitude: req.latitude,
        longitude: req.longitude,
        price: req.price,
        housing_type,
        status,
        photos: req.photos,
    };

    let listing = state
        .store
        .update_listing(id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("listing {id} not found")))?;

    Ok(HttpResponse::Ok().json(CreatedResponse {
        success: true,
        data: ListingData::from(listing),
        message: "listing updated".to_string(),
    }))
}

/// Soft delete: the listing becomes unavailable but the row is kept.
/// Refused while active reservations exist.
///
/// DELETE /api/logements/{id}
async fn delete_listing(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    state.store.deactivate_listing(id).await?;

    tracing::info!("listing {} deactivated", id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "listing deleted".to_string(),
    }))
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional_text(Some("  proche campus  ".to_string())),
            Some("proche campus".to_string())
        );
    }
}
