use crate::core::filters;
use crate::models::{
    FiltersApplied, GeoConstraint, ListingData, ListingFilters, ListingStatus, Pagination,
    SearchParams, SearchResponse, SearchStats, SortKey,
};
use crate::routes::{load_preferences, page_window, ApiError, AppState, SearchLimits};
use actix_web::{web, HttpResponse};

/// Configure search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/search", web::get().to(search_listings));
}

/// Advanced listing search
///
/// GET /api/search?type_logement&prix_min&prix_max&lat&lng&radius&sort_by&locataire_id&score_min&page&limit
///
/// Only available listings are offered. When `locataire_id` is supplied,
/// every result carries a compatibility score and `sort_by=compatibility`
/// becomes valid.
async fn search_listings(
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
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

    let mut search_filters = build_filters(&params, &state.limits)?;
    // The public search only ever offers bookable listings
    search_filters.status = Some(ListingStatus::Available);

    let preferences = match params.tenant_id {
        Some(tenant_id) => Some(load_preferences(&state, tenant_id).await?),
        None => None,
    };

    let candidates = state
        .store
        .fetch_candidates(&search_filters, state.limits.max_candidates)
        .await?;
    tracing::debug!("search fetched {} candidates", candidates.len());

    let outcome = state.engine.search(
        candidates,
        &search_filters,
        sort,
        preferences.as_ref().map(|p| p.as_slice()),
        page,
        limit,
    );

    let stats = SearchStats {
        total_results: outcome.total,
        filters_applied: FiltersApplied {
            type_logement: search_filters.housing_type.is_some(),
            prix_range: search_filters.price_min.is_some() || search_filters.price_max.is_some(),
            location: search_filters.geo.is_some(),
            score_min: search_filters.score_min.is_some(),
        },
    };

    let data: Vec<ListingData> = outcome.results.into_iter().map(ListingData::from).collect();

    tracing::info!(
        "search returned {} of {} listings (page {})",
        data.len(),
        outcome.total,
        page
    );

    Ok(HttpResponse::Ok().json(SearchResponse {
        success: true,
        data,
        stats,
        pagination: Pagination::new(page, limit, outcome.total),
    }))
}

/// Build and validate the filter set from raw query parameters. Anything
/// malformed or out of range is rejected here, before any query runs.
fn build_filters(params: &SearchParams, limits: &SearchLimits) -> Result<ListingFilters, ApiError> {
    let housing_type = params
        .housing_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::Validation)?;

    let geo = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some(GeoConstraint {
            lat,
            lng,
            radius_km: params.radius.unwrap_or(limits.default_radius_km),
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
        status: None,
        available: None,
        score_min: params.score_min,
        geo,
    };
    filters::validate(&listing_filters).map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(listing_filters)
}
