//! Slot marketplace endpoint handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{OpenSlotsResponse, SlotResponse, UpdateSlotListingRequest};
use crate::api::identity::CallerIdentity;
use crate::app_state::AppState;
use crate::domain::SlotId;
use crate::error::{ErrorResponse, MarketError};

/// `GET /slots/swappable` — Browse other users' swappable slots.
#[utoipa::path(
    get,
    path = "/api/v1/slots/swappable",
    tag = "Slots",
    summary = "Browse the marketplace",
    description = "Returns every SWAPPABLE slot owned by other users, ordered by start time.",
    responses(
        (status = 200, description = "Open slots", body = OpenSlotsResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
    )
)]
pub async fn list_open_slots(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
) -> impl IntoResponse {
    let slots = state.swap_service.list_open_slots(user_id).await;
    Json(OpenSlotsResponse::from(slots))
}

/// `PUT /slots/{id}/listing` — List or delist one of the caller's slots.
///
/// # Errors
///
/// Returns [`MarketError`] when the slot is missing, not owned by the
/// caller, or held by an active swap request.
#[utoipa::path(
    put,
    path = "/api/v1/slots/{id}/listing",
    tag = "Slots",
    summary = "Toggle a slot's marketplace listing",
    description = "Moves a slot between BUSY and SWAPPABLE. Slots held by a pending swap \
                   request cannot be toggled until the request resolves.",
    params(
        ("id" = uuid::Uuid, Path, description = "Slot UUID"),
    ),
    request_body = UpdateSlotListingRequest,
    responses(
        (status = 200, description = "Slot updated", body = SlotResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 403, description = "Caller does not own the slot", body = ErrorResponse),
        (status = 404, description = "Slot not found", body = ErrorResponse),
        (status = 409, description = "Slot is held by an active swap request", body = ErrorResponse),
    )
)]
pub async fn update_slot_listing(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateSlotListingRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let slot = state
        .swap_service
        .set_slot_listing(user_id, SlotId::from_uuid(id), req.swappable)
        .await?;
    Ok(Json(SlotResponse::from(slot)))
}

/// Slot routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/slots/swappable", get(list_open_slots))
        .route("/slots/{id}/listing", put(update_slot_listing))
}
