//! Swap request record — a proposed exchange of two slots between two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RequestId, SlotId, UserId};

/// Negotiation status of a swap request.
///
/// `Accepted` and `Rejected` are terminal: once a request leaves
/// `Pending` its status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting a response from the responder.
    Pending,
    /// Responder accepted; slot ownership has been exchanged.
    Accepted,
    /// Responder rejected; both slots returned to the marketplace.
    Rejected,
}

impl RequestStatus {
    /// Returns `true` for `Accepted` and `Rejected`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Returns the status as its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// A proposed pairwise exchange of two slots.
///
/// The requester offers `requester_slot_id` against the responder's
/// `responder_slot_id`. The record references slots by ID only; the
/// [`super::SlotStore`] remains the sole owner of slot state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Unique request identifier (immutable after creation).
    pub id: RequestId,

    /// User who initiated the swap offer.
    pub requester_id: UserId,

    /// User who owns the requested slot and decides accept/reject.
    pub responder_id: UserId,

    /// Slot offered by the requester.
    pub requester_slot_id: SlotId,

    /// Slot the requester wants in exchange.
    pub responder_slot_id: SlotId,

    /// Negotiation status.
    pub status: RequestStatus,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// Creates a new `Pending` request for the given participants and slots.
    #[must_use]
    pub fn new(
        requester_id: UserId,
        responder_id: UserId,
        requester_slot_id: SlotId,
        responder_slot_id: SlotId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::new(),
            requester_id,
            responder_id,
            requester_slot_id,
            responder_slot_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user's view of the request book: offers made to them and by them.
#[derive(Debug, Clone, Default)]
pub struct RequestFeed {
    /// Requests where the user is the responder, newest first.
    pub incoming: Vec<SwapRequest>,
    /// Requests where the user is the requester, newest first.
    pub outgoing: Vec<SwapRequest>,
}
