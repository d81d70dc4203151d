//! Swap negotiation endpoint handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    CreateSwapRequest, RequestFeedResponse, RespondToSwapRequest, SwapRequestResponse,
};
use crate::api::identity::CallerIdentity;
use crate::app_state::AppState;
use crate::domain::RequestId;
use crate::error::{ErrorResponse, MarketError};

/// `POST /swap-requests` — Offer a swap of two slots.
///
/// # Errors
///
/// Returns [`MarketError`] when a slot is missing, not owned, or not
/// swappable, or when a concurrent request claimed a slot first.
#[utoipa::path(
    post,
    path = "/api/v1/swap-requests",
    tag = "Swaps",
    summary = "Create a swap request",
    description = "Offers the caller's slot against another user's slot. Both slots are \
                   claimed for the negotiation and stay claimed until the responder resolves it.",
    request_body = CreateSwapRequest,
    responses(
        (status = 201, description = "Swap request created", body = SwapRequestResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 409, description = "A concurrent swap claimed a slot", body = ErrorResponse),
        (status = 422, description = "Slot missing, not owned, or not swappable", body = ErrorResponse),
    )
)]
pub async fn create_swap(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Json(req): Json<CreateSwapRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let request = state
        .swap_service
        .create_swap(user_id, req.my_slot_id, req.their_slot_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SwapRequestResponse::from(request)),
    ))
}

/// `POST /swap-requests/{id}/respond` — Accept or reject a swap request.
///
/// # Errors
///
/// Returns [`MarketError`] when the request is missing, the caller is not
/// the responder, the request is already resolved, or the resolution lost
/// a race at commit time.
#[utoipa::path(
    post,
    path = "/api/v1/swap-requests/{id}/respond",
    tag = "Swaps",
    summary = "Respond to a swap request",
    description = "Accepts (exchanging slot ownership) or rejects (re-listing both slots) a \
                   pending swap request. Only the responder may resolve a request, and only once.",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    request_body = RespondToSwapRequest,
    responses(
        (status = 200, description = "Swap request resolved", body = SwapRequestResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 403, description = "Caller is not the responder", body = ErrorResponse),
        (status = 404, description = "Swap request not found", body = ErrorResponse),
        (status = 409, description = "Already resolved, or lost a race at commit time", body = ErrorResponse),
    )
)]
pub async fn respond_to_swap(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RespondToSwapRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let request = state
        .swap_service
        .respond_to_swap(user_id, RequestId::from_uuid(id), req.accepted)
        .await?;
    Ok(Json(SwapRequestResponse::from(request)))
}

/// `GET /swap-requests` — The caller's incoming and outgoing requests.
#[utoipa::path(
    get,
    path = "/api/v1/swap-requests",
    tag = "Swaps",
    summary = "List the caller's swap requests",
    description = "Returns requests where the caller is the responder (incoming) and the \
                   requester (outgoing), newest first.",
    responses(
        (status = 200, description = "Request feed", body = RequestFeedResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
    )
)]
pub async fn list_swap_requests(
    State(state): State<AppState>,
    CallerIdentity(user_id): CallerIdentity,
) -> impl IntoResponse {
    let feed = state.swap_service.list_requests_for_user(user_id).await;
    Json(RequestFeedResponse::from(feed))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swap-requests", post(create_swap).get(list_swap_requests))
        .route("/swap-requests/{id}/respond", post(respond_to_swap))
}
