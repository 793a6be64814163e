use crate::models::{
    CreateReservationRequest, CreatedResponse, Paged, Pagination, ReservationListParams,
    ReservationStatus, UpdateReservationRequest,
};
use crate::routes::{page_window, ApiError, AppState};
use crate::services::{NewReservation, ReservationFilters};
use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

/// Configure reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/reservations", web::get().to(list_reservations))
        .route("/reservations", web::post().to(create_reservation))
        .route("/reservations/{id}", web::put().to(update_reservation));
}

/// List reservations with filters and pagination
///
/// GET /api/reservations?locataire_id&logement_id&statut_reservation&date_debut&date_fin&page&limit
async fn list_reservations(
    state: web::Data<AppState>,
    query: web::Query<ReservationListParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let (page, limit) = page_window(params.page, params.limit, &state.limits);

    let status = params
        .status
        .as_deref()
        .map(str::parse::<ReservationStatus>)
        .transpose()
        .map_err(ApiError::Validation)?;

    let reservation_filters = ReservationFilters {
        tenant_id: params.tenant_id,
        listing_id: params.listing_id,
        status,
        start_from: params.start_from,
        end_until: params.end_until,
    };

    let (reservations, total) = state
        .store
        .list_reservations(&reservation_filters, page, limit)
        .await?;

    Ok(HttpResponse::Ok().json(Paged {
        success: true,
        data: reservations,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Create a reservation.
///
/// POST /api/reservations
///
/// The availability check and the listing's status transition happen as a
/// single conditional update in the store, so two concurrent requests for
/// the same listing cannot both book it.
async fn create_reservation(
    state: web::Data<AppState>,
    body: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    let now = chrono::Utc::now();
    if req.start_date <= now {
        return Err(ApiError::Validation(
            "start date must be in the future".to_string(),
        ));
    }
    if req.end_date <= req.start_date {
        return Err(ApiError::Validation(
            "end date must be after the start date".to_string(),
        ));
    }

    state
        .store
        .fetch_tenant(req.tenant_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| ApiError::NotFound("tenant not found or inactive".to_string()))?;

    state
        .store
        .fetch_listing(req.listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("listing {} not found", req.listing_id)))?;

    if state
        .store
        .tenant_has_overlapping_reservation(req.tenant_id, req.start_date, req.end_date)
        .await?
    {
        return Err(ApiError::Conflict(
            "tenant already has a reservation over this period".to_string(),
        ));
    }

    let reservation = state
        .store
        .create_reservation(NewReservation {
            tenant_id: req.tenant_id,
            listing_id: req.listing_id,
            amount: req.amount,
            start_date: req.start_date,
            end_date: req.end_date,
            contract_url: req.contract_url,
        })
        .await?;

    tracing::info!(
        "reservation {} created for listing {} by tenant {}",
        reservation.id,
        reservation.listing_id,
        reservation.tenant_id
    );

    Ok(HttpResponse::Created().json(CreatedResponse {
        success: true,
        data: reservation,
        message: "reservation created".to_string(),
    }))
}

/// Apply a status transition to a reservation. Cancelling releases the
/// listing back to available.
///
/// PUT /api/reservations/{id}
async fn update_reservation(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReservationRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let next = body
        .into_inner()
        .status
        .parse::<ReservationStatus>()
        .map_err(ApiError::Validation)?;

    let reservation = state.store.update_reservation_status(id, next).await?;

    tracing::info!("reservation {} moved to {:?}", reservation.id, reservation.status);

    Ok(HttpResponse::Ok().json(CreatedResponse {
        success: true,
        data: reservation,
        message: "reservation updated".to_string(),
    }))
}
