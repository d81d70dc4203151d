//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` lives at
//! the root.

pub mod dto;
pub mod handlers;
pub mod identity;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the whole REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "slotswap",
        description = "Calendar-slot swap marketplace API"
    ),
    paths(
        handlers::swap::create_swap,
        handlers::swap::respond_to_swap,
        handlers::swap::list_swap_requests,
        handlers::slot::list_open_slots,
        handlers::slot::update_slot_listing,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreateSwapRequest,
        dto::RespondToSwapRequest,
        dto::SwapRequestResponse,
        dto::RequestFeedResponse,
        dto::UpdateSlotListingRequest,
        dto::SlotResponse,
        dto::OpenSlotsResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Swaps", description = "Swap negotiation"),
        (name = "Slots", description = "Marketplace browsing and listing"),
        (name = "System", description = "Health and diagnostics"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
