//! Authorization predicates for the negotiation protocol.
//!
//! Pure functions over already-fetched records — no I/O, no side effects.
//! Callers translate a `false` into the appropriate error kind
//! ([`crate::error::MarketError::Forbidden`], or `InvalidSlot` on the
//! request-creation path).

use super::{Slot, SwapRequest, UserId};

/// Returns `true` if `user_id` owns the given slot.
#[must_use]
pub fn owns_slot(user_id: UserId, slot: &Slot) -> bool {
    slot.owner_id == user_id
}

/// Returns `true` if `user_id` is the responder of the given request,
/// i.e. the user entitled to accept or reject it.
#[must_use]
pub fn is_responder(user_id: UserId, request: &SwapRequest) -> bool {
    request.responder_id == user_id
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::SlotId;

    #[test]
    fn owner_passes_owns_slot() {
        let owner = UserId::new();
        let slot = Slot::new(owner, "shift".to_string(), Utc::now(), Utc::now());
        assert!(owns_slot(owner, &slot));
        assert!(!owns_slot(UserId::new(), &slot));
    }

    #[test]
    fn only_responder_passes_is_responder() {
        let requester = UserId::new();
        let responder = UserId::new();
        let request = SwapRequest::new(requester, responder, SlotId::new(), SlotId::new());
        assert!(is_responder(responder, &request));
        assert!(!is_responder(requester, &request));
        assert!(!is_responder(UserId::new(), &request));
    }
}
