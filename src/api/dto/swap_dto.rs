//! Swap request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{RequestFeed, RequestId, RequestStatus, SlotId, SwapRequest, UserId};

/// Request body for `POST /swap-requests`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSwapRequest {
    /// The caller's slot being offered.
    pub my_slot_id: SlotId,
    /// The other user's slot being requested.
    pub their_slot_id: SlotId,
}

/// Request body for `POST /swap-requests/{id}/respond`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondToSwapRequest {
    /// `true` to accept the swap, `false` to reject it.
    pub accepted: bool,
}

/// A swap request as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct SwapRequestResponse {
    /// Request identifier.
    pub id: RequestId,
    /// Initiating user.
    pub requester_id: UserId,
    /// User who decides accept/reject.
    pub responder_id: UserId,
    /// Slot offered by the requester.
    pub requester_slot_id: SlotId,
    /// Slot requested from the responder.
    pub responder_slot_id: SlotId,
    /// Negotiation status.
    pub status: RequestStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<SwapRequest> for SwapRequestResponse {
    fn from(request: SwapRequest) -> Self {
        Self {
            id: request.id,
            requester_id: request.requester_id,
            responder_id: request.responder_id,
            requester_slot_id: request.requester_slot_id,
            responder_slot_id: request.responder_slot_id,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Response body for `GET /swap-requests`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestFeedResponse {
    /// Requests awaiting the caller's response, newest first.
    pub incoming: Vec<SwapRequestResponse>,
    /// Requests the caller has made, newest first.
    pub outgoing: Vec<SwapRequestResponse>,
    /// Number of incoming requests.
    pub total_incoming: usize,
    /// Number of outgoing requests.
    pub total_outgoing: usize,
}

impl From<RequestFeed> for RequestFeedResponse {
    fn from(feed: RequestFeed) -> Self {
        let incoming: Vec<SwapRequestResponse> =
            feed.incoming.into_iter().map(Into::into).collect();
        let outgoing: Vec<SwapRequestResponse> =
            feed.outgoing.into_iter().map(Into::into).collect();
        Self {
            total_incoming: incoming.len(),
            total_outgoing: outgoing.len(),
            incoming,
            outgoing,
        }
    }
}
