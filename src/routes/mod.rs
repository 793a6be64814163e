// Route exports
pub mod listings;
pub mod preferences;
pub mod reservations;
pub mod reviews;
pub mod search;

use crate::core::SearchEngine;
use crate::models::{ErrorResponse, HealthResponse, TenantPreference};
use crate::services::{PreferenceCache, RatingAggregator, Store, StoreError};
use actix_web::http::StatusCode;
use actix_web::{error, web, HttpResponse, Responder, ResponseError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub preferences: Arc<PreferenceCache>,
    pub aggregator: Arc<RatingAggregator>,
    pub engine: SearchEngine,
    pub limits: SearchLimits,
}

/// Paging and candidate-set bounds, loaded from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
    pub max_candidates: i64,
    pub default_radius_km: f64,
}

/// Error taxonomy of the HTTP surface: validation (400), not-found (404),
/// conflict (409) and opaque store failures (500). An empty result set is
/// a success, not an error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            other => ApiError::Store(other),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Store(err) = self {
            tracing::error!("store failure: {}", err);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
        })
    }
}

/// Handle malformed JSON bodies with the same error shape as everything else
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Validation(format!("invalid JSON payload: {err}")).into()
}

/// Handle malformed query strings (non-numeric numbers, bad UUIDs, ...)
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("query payload error on {}: {}", req.path(), err);
    ApiError::Validation(format!("invalid query string: {err}")).into()
}

/// Configure all routes under /api
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .configure(search::configure)
            .configure(listings::configure)
            .configure(reviews::configure)
            .configure(reservations::configure)
            .configure(preferences::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Resolve the page window from optional query values: page is 1-indexed,
/// the limit is clamped to the configured maximum.
pub(crate) fn page_window(
    page: Option<usize>,
    limit: Option<usize>,
    limits: &SearchLimits,
) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(limits.default_limit).clamp(1, limits.max_limit);
    (page, limit)
}

/// Fetch a tenant's preferences through the cache, verifying the tenant
/// exists and is active.
pub(crate) async fn load_preferences(
    state: &AppState,
    tenant_id: Uuid,
) -> Result<Arc<Vec<TenantPreference>>, ApiError> {
    let tenant = state
        .store
        .fetch_tenant(tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tenant {tenant_id} not found")))?;
    if !tenant.is_active {
        return Err(ApiError::NotFound(format!("tenant {tenant_id} is inactive")));
    }

    if let Some(hit) = state.preferences.get(tenant_id).await {
        return Ok(hit);
    }

    let preferences = state.store.fetch_preferences(tenant_id).await?;
    Ok(state.preferences.insert(tenant_id, preferences).await)
}
