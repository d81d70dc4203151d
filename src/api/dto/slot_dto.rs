//! Slot DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Slot, SlotId, SlotStatus, UserId};

/// Request body for `PUT /slots/{id}/listing`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSlotListingRequest {
    /// `true` to list the slot on the marketplace, `false` to delist it.
    pub swappable: bool,
}

/// A slot as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    /// Slot identifier.
    pub id: SlotId,
    /// Owning user.
    pub owner_id: UserId,
    /// Human-readable title.
    pub title: String,
    /// Scheduled start of the slot.
    pub start_time: DateTime<Utc>,
    /// Scheduled end of the slot.
    pub end_time: DateTime<Utc>,
    /// Swap lifecycle status.
    pub status: SlotStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            owner_id: slot.owner_id,
            title: slot.title,
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: slot.status,
            created_at: slot.created_at,
            updated_at: slot.updated_at,
        }
    }
}

/// Response body for `GET /slots/swappable`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OpenSlotsResponse {
    /// Other users' swappable slots, ordered by start time.
    pub slots: Vec<SlotResponse>,
    /// Number of slots returned.
    pub count: usize,
}

impl From<Vec<Slot>> for OpenSlotsResponse {
    fn from(slots: Vec<Slot>) -> Self {
        let slots: Vec<SlotResponse> = slots.into_iter().map(Into::into).collect();
        Self {
            count: slots.len(),
            slots,
        }
    }
}
