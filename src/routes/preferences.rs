use crate::models::{
    CreatedResponse, DataResponse, PreferenceQuery, UpsertPreferencesRequest,
};
use crate::routes::{ApiError, AppState};
use crate::services::NewPreference;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure preference routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/preferences", web::get().to(get_preferences))
        .route("/preferences", web::post().to(upsert_preferences));
}

/// Fetch a tenant's stored preferences
///
/// GET /api/preferences?locataire_id
async fn get_preferences(
    state: web::Data<AppState>,
    query: web::Query<PreferenceQuery>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = query.into_inner().tenant_id;

    state
        .store
        .fetch_tenant(tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tenant {tenant_id} not found")))?;

    let preferences = state.store.fetch_preferences(tenant_id).await?;

    Ok(HttpResponse::Ok().json(DataResponse {
        success: true,
        data: preferences,
    }))
}

/// Create or replace a tenant's preferences and drop the cached entry.
///
/// POST /api/preferences
async fn upsert_preferences(
    state: web::Data<AppState>,
    body: web::Json<UpsertPreferencesRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    if req.budget_min > req.budget_max {
        return Err(ApiError::Validation(format!(
            "budget_min ({}) cannot be greater than budget_max ({})",
            req.budget_min, req.budget_max
        )));
    }

    let housing_type = req
        .housing_type
        .parse()
        .map_err(ApiError::Validation)?;

    state
        .store
        .fetch_tenant(req.tenant_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| ApiError::NotFound("tenant not found or inactive".to_string()))?;

    let preference = state
        .store
        .upsert_preferences(NewPreference {
            tenant_id: req.tenant_id,
            housing_type,
            budget_min: req.budget_min,
            budget_max: req.budget_max,
            radius_km: req.radius_km,
            notes: req
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
        })
        .await?;

    // The next personalized search must see the new preferences
    state.preferences.invalidate(req.tenant_id).await;

    Ok(HttpResponse::Ok().json(CreatedResponse {
        success: true,
        data: preference,
        message: "preferences saved".to_string(),
    }))
}
