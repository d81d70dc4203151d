//! Domain events reflecting marketplace state mutations.
//!
//! Every successful transition publishes a [`SwapEvent`] through the
//! [`super::EventBus`]. Subscribers (the persistence event log, or any
//! future delivery layer) observe transitions without the negotiation
//! engine knowing about them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RequestId, SlotId, UserId};

/// Domain event emitted after every successful state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SwapEvent {
    /// Emitted when a swap request is created and both slots are claimed.
    RequestCreated {
        /// Request identifier.
        request_id: RequestId,
        /// Initiating user.
        requester_id: UserId,
        /// User who owns the requested slot.
        responder_id: UserId,
        /// Slot offered by the requester.
        requester_slot_id: SlotId,
        /// Slot requested from the responder.
        responder_slot_id: SlotId,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a request is accepted and ownership has been exchanged.
    RequestAccepted {
        /// Request identifier.
        request_id: RequestId,
        /// Initiating user — now owns the responder's former slot.
        requester_id: UserId,
        /// Responding user — now owns the requester's former slot.
        responder_id: UserId,
        /// Slot transferred to the responder.
        requester_slot_id: SlotId,
        /// Slot transferred to the requester.
        responder_slot_id: SlotId,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a request is rejected and both slots are re-listed.
    RequestRejected {
        /// Request identifier.
        request_id: RequestId,
        /// Initiating user.
        requester_id: UserId,
        /// Responding user.
        responder_id: UserId,
        /// Requester's slot, back on the marketplace.
        requester_slot_id: SlotId,
        /// Responder's slot, back on the marketplace.
        responder_slot_id: SlotId,
        /// Resolution timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an owner lists a slot on the marketplace.
    SlotListed {
        /// Slot identifier.
        slot_id: SlotId,
        /// Owning user.
        owner_id: UserId,
        /// Listing timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when an owner takes a slot off the marketplace.
    SlotDelisted {
        /// Slot identifier.
        slot_id: SlotId,
        /// Owning user.
        owner_id: UserId,
        /// Delisting timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl SwapEvent {
    /// Returns the UUID of the record this event is about — the request
    /// for negotiation events, the slot for listing events.
    #[must_use]
    pub fn subject_id(&self) -> uuid::Uuid {
        match self {
            Self::RequestCreated { request_id, .. }
            | Self::RequestAccepted { request_id, .. }
            | Self::RequestRejected { request_id, .. } => *request_id.as_uuid(),
            Self::SlotListed { slot_id, .. } | Self::SlotDelisted { slot_id, .. } => {
                *slot_id.as_uuid()
            }
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "request_created",
            Self::RequestAccepted { .. } => "request_accepted",
            Self::RequestRejected { .. } => "request_rejected",
            Self::SlotListed { .. } => "slot_listed",
            Self::SlotDelisted { .. } => "slot_delisted",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn request_created_event_type() {
        let event = SwapEvent::RequestCreated {
            request_id: RequestId::new(),
            requester_id: UserId::new(),
            responder_id: UserId::new(),
            requester_slot_id: SlotId::new(),
            responder_slot_id: SlotId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "request_created");
    }

    #[test]
    fn subject_id_is_request_for_negotiation_events() {
        let id = RequestId::new();
        let event = SwapEvent::RequestRejected {
            request_id: id,
            requester_id: UserId::new(),
            responder_id: UserId::new(),
            requester_slot_id: SlotId::new(),
            responder_slot_id: SlotId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.subject_id(), *id.as_uuid());
    }

    #[test]
    fn subject_id_is_slot_for_listing_events() {
        let id = SlotId::new();
        let event = SwapEvent::SlotListed {
            slot_id: id,
            owner_id: UserId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.subject_id(), *id.as_uuid());
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = SwapEvent::SlotDelisted {
            slot_id: SlotId::new(),
            owner_id: UserId::new(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("slot_delisted"));
        assert!(json_str.contains("owner_id"));
    }
}
