//! Swap service: the negotiation engine over slots and swap requests.
//!
//! Implements the state machine governing a swap request and the two slot
//! records it references:
//!
//! | State      | request  | requester slot     | responder slot     |
//! |------------|----------|--------------------|--------------------|
//! | Open       | (none)   | SWAPPABLE          | SWAPPABLE          |
//! | Negotiating| PENDING  | SWAP_PENDING       | SWAP_PENDING       |
//! | Accepted   | ACCEPTED | BUSY (owner swapped) | BUSY (owner swapped) |
//! | Rejected   | REJECTED | SWAPPABLE          | SWAPPABLE          |
//!
//! Every multi-record transition is applied as a saga: the store
//! compare-and-set operations arbitrate races, and a step that loses its
//! race compensates all earlier steps before surfacing the failure. A
//! caller therefore never observes a partially applied transition outcome —
//! a failed creation leaves no request and both slots `SWAPPABLE`, and a
//! failed resolution leaves the request `PENDING`, safe to retry.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::access;
use crate::domain::{
    EventBus, RequestFeed, RequestId, RequestStatus, RequestStore, Slot, SlotId, SlotStatus,
    SlotStore, SwapEvent, SwapRequest, UserId,
};
use crate::error::MarketError;

/// Orchestration layer for the negotiation protocol.
///
/// Stateless coordinator: owns handles to the [`SlotStore`] and
/// [`RequestStore`] for state and the [`EventBus`] for event emission —
/// all injected, never reached for globally. Every mutation method
/// follows the pattern: validate preconditions → apply the transition via
/// store compare-and-set (compensating on a lost race) → emit events →
/// return the result.
#[derive(Debug, Clone)]
pub struct SwapService {
    slots: Arc<SlotStore>,
    requests: Arc<RequestStore>,
    event_bus: EventBus,
}

impl SwapService {
    /// Creates a new `SwapService`.
    #[must_use]
    pub fn new(slots: Arc<SlotStore>, requests: Arc<RequestStore>, event_bus: EventBus) -> Self {
        Self {
            slots,
            requests,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`SlotStore`].
    #[must_use]
    pub fn slots(&self) -> &Arc<SlotStore> {
        &self.slots
    }

    /// Returns a reference to the inner [`RequestStore`].
    #[must_use]
    pub fn requests(&self) -> &Arc<RequestStore> {
        &self.requests
    }

    /// Creates a swap request offering `my_slot_id` against
    /// `their_slot_id` and claims both slots for the negotiation.
    ///
    /// Preconditions are checked in order, first failure wins: the offered
    /// slot must exist, belong to the requester, and be `SWAPPABLE`; the
    /// target slot must exist, belong to someone else, and be `SWAPPABLE`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidSlot`] on any precondition failure,
    /// or [`MarketError::Conflict`] when a concurrent request claimed one
    /// of the slots first — in which case the created request is deleted
    /// and any slot already claimed is released, leaving no visible state
    /// change.
    pub async fn create_swap(
        &self,
        requester_id: UserId,
        my_slot_id: SlotId,
        their_slot_id: SlotId,
    ) -> Result<SwapRequest, MarketError> {
        if my_slot_id == their_slot_id {
            return Err(MarketError::InvalidSlot(
                "a slot cannot be swapped with itself".to_string(),
            ));
        }

        let my_slot = self.slots.get(my_slot_id).await.map_err(|_| {
            MarketError::InvalidSlot("your slot was not found".to_string())
        })?;
        if !access::owns_slot(requester_id, &my_slot) {
            return Err(MarketError::InvalidSlot(
                "you do not own the offered slot".to_string(),
            ));
        }
        if my_slot.status != SlotStatus::Swappable {
            return Err(MarketError::InvalidSlot(
                "your slot is not available for swapping".to_string(),
            ));
        }

        let their_slot = self.slots.get(their_slot_id).await.map_err(|_| {
            MarketError::InvalidSlot("target slot was not found".to_string())
        })?;
        if their_slot.owner_id == requester_id {
            return Err(MarketError::InvalidSlot(
                "target slot already belongs to you".to_string(),
            ));
        }
        if their_slot.status != SlotStatus::Swappable {
            return Err(MarketError::InvalidSlot(
                "target slot is not available for swapping".to_string(),
            ));
        }

        let request = SwapRequest::new(
            requester_id,
            their_slot.owner_id,
            my_slot_id,
            their_slot_id,
        );
        let request_id = request.id;
        self.requests.insert(request.clone()).await?;

        // Claim both slots. A failed claim means another request won the
        // race between our precondition read and now; undo everything.
        if self
            .slots
            .compare_and_set_status(my_slot_id, SlotStatus::Swappable, SlotStatus::SwapPending)
            .await
            .is_err()
        {
            let _ = self.requests.delete(request_id).await;
            tracing::warn!(%request_id, slot_id = %my_slot_id, "offered slot claimed concurrently, creation rolled back");
            return Err(MarketError::Conflict(
                "offered slot was claimed by another swap".to_string(),
            ));
        }
        if self
            .slots
            .compare_and_set_status(their_slot_id, SlotStatus::Swappable, SlotStatus::SwapPending)
            .await
            .is_err()
        {
            let _ = self
                .slots
                .compare_and_set_status(my_slot_id, SlotStatus::SwapPending, SlotStatus::Swappable)
                .await;
            let _ = self.requests.delete(request_id).await;
            tracing::warn!(%request_id, slot_id = %their_slot_id, "target slot claimed concurrently, creation rolled back");
            return Err(MarketError::Conflict(
                "target slot was claimed by another swap".to_string(),
            ));
        }

        let _ = self.event_bus.publish(SwapEvent::RequestCreated {
            request_id,
            requester_id,
            responder_id: request.responder_id,
            requester_slot_id: my_slot_id,
            responder_slot_id: their_slot_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%request_id, requester = %requester_id, responder = %request.responder_id, "swap request created");
        Ok(request)
    }

    /// Resolves a pending swap request as accepted or rejected.
    ///
    /// Only the responder may resolve a request, and only once: a request
    /// that has already left `PENDING` always answers `AlreadyResolved`,
    /// never idempotent success, so the caller knows no new action occurred.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RequestNotFound`] if the request does not
    /// exist, [`MarketError::Forbidden`] if the caller is not the
    /// responder, [`MarketError::AlreadyResolved`] if the request is
    /// terminal, or [`MarketError::Conflict`] if the transition lost a
    /// race at commit time (the request is then still `PENDING`).
    pub async fn respond_to_swap(
        &self,
        acting_user_id: UserId,
        request_id: RequestId,
        accepted: bool,
    ) -> Result<SwapRequest, MarketError> {
        let request = self.requests.get(request_id).await?;
        if !access::is_responder(acting_user_id, &request) {
            return Err(MarketError::Forbidden);
        }
        if request.status.is_terminal() {
            return Err(MarketError::AlreadyResolved(request_id));
        }

        if accepted {
            self.accept(request).await
        } else {
            self.reject(request).await
        }
    }

    /// Accept: mark the request `ACCEPTED` and exchange slot ownership.
    /// Both slots leave the swap workflow as `BUSY` under their new owners.
    async fn accept(&self, request: SwapRequest) -> Result<SwapRequest, MarketError> {
        let request_id = request.id;
        let accepted = self
            .requests
            .compare_and_set_status(request_id, RequestStatus::Pending, RequestStatus::Accepted)
            .await
            .map_err(|err| match err {
                // The other side of a resolution race already settled it.
                MarketError::Conflict(_) => MarketError::AlreadyResolved(request_id),
                other => other,
            })?;

        let prior_requester_slot = match self
            .slots
            .transfer_ownership(
                request.requester_slot_id,
                request.responder_id,
                SlotStatus::Busy,
            )
            .await
        {
            Ok(prior) => prior,
            Err(_) => {
                let _ = self
                    .requests
                    .compare_and_set_status(
                        request_id,
                        RequestStatus::Accepted,
                        RequestStatus::Pending,
                    )
                    .await;
                tracing::warn!(%request_id, slot_id = %request.requester_slot_id, "offered slot vanished mid-acceptance, resolution rolled back");
                return Err(MarketError::Conflict(
                    "offered slot disappeared during acceptance".to_string(),
                ));
            }
        };
        if self
            .slots
            .transfer_ownership(
                request.responder_slot_id,
                request.requester_id,
                SlotStatus::Busy,
            )
            .await
            .is_err()
        {
            let _ = self
                .slots
                .transfer_ownership(
                    request.requester_slot_id,
                    prior_requester_slot.owner_id,
                    prior_requester_slot.status,
                )
                .await;
            let _ = self
                .requests
                .compare_and_set_status(
                    request_id,
                    RequestStatus::Accepted,
                    RequestStatus::Pending,
                )
                .await;
            tracing::warn!(%request_id, slot_id = %request.responder_slot_id, "requested slot vanished mid-acceptance, resolution rolled back");
            return Err(MarketError::Conflict(
                "requested slot disappeared during acceptance".to_string(),
            ));
        }

        let _ = self.event_bus.publish(SwapEvent::RequestAccepted {
            request_id,
            requester_id: request.requester_id,
            responder_id: request.responder_id,
            requester_slot_id: request.requester_slot_id,
            responder_slot_id: request.responder_slot_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%request_id, "swap request accepted, ownership exchanged");
        Ok(accepted)
    }

    /// Reject: mark the request `REJECTED` and return both slots to the
    /// marketplace, owners unchanged.
    ///
    /// A slot that was moved out of `SWAP_PENDING` behind the protocol's
    /// back fails its compare-and-set here; the resolution is then rolled
    /// back and surfaced as `Conflict` — never a silent no-op — with the
    /// request left `PENDING` for a later retry.
    async fn reject(&self, request: SwapRequest) -> Result<SwapRequest, MarketError> {
        let request_id = request.id;
        let rejected = self
            .requests
            .compare_and_set_status(request_id, RequestStatus::Pending, RequestStatus::Rejected)
            .await
            .map_err(|err| match err {
                MarketError::Conflict(_) => MarketError::AlreadyResolved(request_id),
                other => other,
            })?;

        if self
            .slots
            .compare_and_set_status(
                request.requester_slot_id,
                SlotStatus::SwapPending,
                SlotStatus::Swappable,
            )
            .await
            .is_err()
        {
            let _ = self
                .requests
                .compare_and_set_status(
                    request_id,
                    RequestStatus::Rejected,
                    RequestStatus::Pending,
                )
                .await;
            tracing::warn!(%request_id, slot_id = %request.requester_slot_id, "offered slot no longer awaiting swap, rejection rolled back");
            return Err(MarketError::Conflict(
                "offered slot is no longer held by this swap".to_string(),
            ));
        }
        if self
            .slots
            .compare_and_set_status(
                request.responder_slot_id,
                SlotStatus::SwapPending,
                SlotStatus::Swappable,
            )
            .await
            .is_err()
        {
            let _ = self
                .slots
                .compare_and_set_status(
                    request.requester_slot_id,
                    SlotStatus::Swappable,
                    SlotStatus::SwapPending,
                )
                .await;
            let _ = self
                .requests
                .compare_and_set_status(
                    request_id,
                    RequestStatus::Rejected,
                    RequestStatus::Pending,
                )
                .await;
            tracing::warn!(%request_id, slot_id = %request.responder_slot_id, "requested slot no longer awaiting swap, rejection rolled back");
            return Err(MarketError::Conflict(
                "requested slot is no longer held by this swap".to_string(),
            ));
        }

        let _ = self.event_bus.publish(SwapEvent::RequestRejected {
            request_id,
            requester_id: request.requester_id,
            responder_id: request.responder_id,
            requester_slot_id: request.requester_slot_id,
            responder_slot_id: request.responder_slot_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%request_id, "swap request rejected, slots re-listed");
        Ok(rejected)
    }

    /// Lists or delists one of the caller's slots on the marketplace.
    ///
    /// Re-listing an already-listed slot (or delisting an already-busy
    /// one) is a no-op success. A slot claimed by an active negotiation
    /// cannot be toggled until the request resolves.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::SlotNotFound`] if the slot does not exist,
    /// [`MarketError::Forbidden`] if the caller does not own it, or
    /// [`MarketError::Conflict`] if the slot is `SWAP_PENDING` or lost a
    /// toggle race.
    pub async fn set_slot_listing(
        &self,
        acting_user_id: UserId,
        slot_id: SlotId,
        swappable: bool,
    ) -> Result<Slot, MarketError> {
        let slot = self.slots.get(slot_id).await?;
        if !access::owns_slot(acting_user_id, &slot) {
            return Err(MarketError::Forbidden);
        }
        if slot.status == SlotStatus::SwapPending {
            return Err(MarketError::Conflict(
                "slot is held by an active swap request".to_string(),
            ));
        }

        let (expected, target) = if swappable {
            (SlotStatus::Busy, SlotStatus::Swappable)
        } else {
            (SlotStatus::Swappable, SlotStatus::Busy)
        };
        if slot.status == target {
            return Ok(slot);
        }

        let updated = self
            .slots
            .compare_and_set_status(slot_id, expected, target)
            .await?;

        let timestamp = Utc::now();
        let event = if swappable {
            SwapEvent::SlotListed {
                slot_id,
                owner_id: acting_user_id,
                timestamp,
            }
        } else {
            SwapEvent::SlotDelisted {
                slot_id,
                owner_id: acting_user_id,
                timestamp,
            }
        };
        let _ = self.event_bus.publish(event);

        tracing::info!(%slot_id, owner = %acting_user_id, swappable, "slot listing changed");
        Ok(updated)
    }

    /// Returns the marketplace view for a user: other users' `SWAPPABLE`
    /// slots, ordered by start time.
    pub async fn list_open_slots(&self, viewer: UserId) -> Vec<Slot> {
        self.slots.list_open(viewer).await
    }

    /// Returns the user's incoming and outgoing swap requests, newest
    /// first. Read-only; no negotiation logic.
    pub async fn list_requests_for_user(&self, user_id: UserId) -> RequestFeed {
        self.requests.list_for_user(user_id).await
    }
}
