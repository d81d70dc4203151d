//! Calendar slot record and its swap lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SlotId, UserId};

/// Swap lifecycle status of a calendar slot.
///
/// Serialized on the wire in upper snake case (`"SWAP_PENDING"` etc.),
/// matching the values stored in event payloads and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    /// Regular calendar entry, not offered on the marketplace.
    Busy,
    /// Listed on the marketplace and open to swap offers.
    Swappable,
    /// Claimed by exactly one pending swap request.
    SwapPending,
}

impl SlotStatus {
    /// Returns the status as its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::Swappable => "SWAPPABLE",
            Self::SwapPending => "SWAP_PENDING",
        }
    }
}

/// A calendar slot — the unit that can be exchanged on the marketplace.
///
/// The negotiation engine only interprets `owner_id` and `status`; title
/// and the scheduling window are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot identifier (immutable after creation).
    pub id: SlotId,

    /// Current owner. Changes only when an accepted swap transfers the slot.
    pub owner_id: UserId,

    /// Human-readable title.
    pub title: String,

    /// Scheduled start of the slot.
    pub start_time: DateTime<Utc>,

    /// Scheduled end of the slot.
    pub end_time: DateTime<Utc>,

    /// Swap lifecycle status.
    pub status: SlotStatus,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    /// Creates a new `Busy` slot owned by the given user.
    #[must_use]
    pub fn new(
        owner_id: UserId,
        title: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SlotId::new(),
            owner_id,
            title,
            start_time,
            end_time,
            status: SlotStatus::Busy,
            created_at: now,
            updated_at: now,
        }
    }
}
