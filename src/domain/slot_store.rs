//! Concurrent slot storage with compare-and-set status updates.
//!
//! [`SlotStore`] keeps all slot records in a `HashMap` behind a
//! [`tokio::sync::RwLock`]. Status changes go through
//! [`SlotStore::compare_and_set_status`], which succeeds only when the
//! stored status matches the caller's expectation — the primitive that
//! prevents two concurrent negotiations from both claiming the same slot.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{Slot, SlotId, SlotStatus, UserId};
use crate::error::MarketError;

/// Central store for all calendar slots.
///
/// # Concurrency
///
/// Every operation takes the lock for the duration of a single read or a
/// single record write, so each individual operation is atomic. Multi-record
/// protocols (claiming both slots of a swap) are built on top of
/// [`SlotStore::compare_and_set_status`] by the negotiation engine, which
/// compensates on a lost race.
#[derive(Debug, Default)]
pub struct SlotStore {
    slots: RwLock<HashMap<SlotId, Slot>>,
}

impl SlotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new slot record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Conflict`] if a slot with the same ID already
    /// exists (should never happen with UUID v4).
    pub async fn insert(&self, slot: Slot) -> Result<SlotId, MarketError> {
        let slot_id = slot.id;
        let mut map = self.slots.write().await;
        if map.contains_key(&slot_id) {
            return Err(MarketError::Conflict(format!(
                "slot {slot_id} already exists"
            )));
        }
        map.insert(slot_id, slot);
        Ok(slot_id)
    }

    /// Returns a copy of the slot record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::SlotNotFound`] if no slot with the given ID
    /// exists.
    pub async fn get(&self, slot_id: SlotId) -> Result<Slot, MarketError> {
        let map = self.slots.read().await;
        map.get(&slot_id)
            .cloned()
            .ok_or(MarketError::SlotNotFound(slot_id))
    }

    /// Sets the slot's status to `new` only if it currently equals
    /// `expected`, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::SlotNotFound`] if the slot does not exist, or
    /// [`MarketError::Conflict`] if the stored status no longer matches
    /// `expected` (a concurrent mutation won the race).
    pub async fn compare_and_set_status(
        &self,
        slot_id: SlotId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<Slot, MarketError> {
        let mut map = self.slots.write().await;
        let slot = map
            .get_mut(&slot_id)
            .ok_or(MarketError::SlotNotFound(slot_id))?;
        if slot.status != expected {
            return Err(MarketError::Conflict(format!(
                "slot {slot_id} is {}, expected {}",
                slot.status.as_str(),
                expected.as_str()
            )));
        }
        slot.status = new;
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    /// Atomically changes `owner_id` and `status` together, returning the
    /// record **as it was before the write** so a failed multi-slot
    /// protocol can restore it.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::SlotNotFound`] if the slot does not exist.
    pub async fn transfer_ownership(
        &self,
        slot_id: SlotId,
        new_owner_id: UserId,
        new_status: SlotStatus,
    ) -> Result<Slot, MarketError> {
        let mut map = self.slots.write().await;
        let slot = map
            .get_mut(&slot_id)
            .ok_or(MarketError::SlotNotFound(slot_id))?;
        let prior = slot.clone();
        slot.owner_id = new_owner_id;
        slot.status = new_status;
        slot.updated_at = Utc::now();
        Ok(prior)
    }

    /// Returns all `Swappable` slots not owned by `viewer`, ordered by
    /// start time — the marketplace browse query.
    pub async fn list_open(&self, viewer: UserId) -> Vec<Slot> {
        let map = self.slots.read().await;
        let mut open: Vec<Slot> = map
            .values()
            .filter(|slot| slot.status == SlotStatus::Swappable && slot.owner_id != viewer)
            .cloned()
            .collect();
        open.sort_by_key(|slot| slot.start_time);
        open
    }

    /// Returns a copy of every slot record, for snapshot persistence.
    pub async fn dump(&self) -> Vec<Slot> {
        self.slots.read().await.values().cloned().collect()
    }

    /// Replaces the store contents with the given records, for snapshot
    /// restore at startup.
    pub async fn seed(&self, slots: Vec<Slot>) {
        let mut map = self.slots.write().await;
        map.clear();
        map.extend(slots.into_iter().map(|slot| (slot.id, slot)));
    }

    /// Returns the number of slots in the store.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Returns `true` if the store contains no slots.
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_slot(owner: UserId, status: SlotStatus) -> Slot {
        let mut slot = Slot::new(owner, "shift".to_string(), Utc::now(), Utc::now());
        slot.status = status;
        slot
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = SlotStore::new();
        let slot = make_slot(UserId::new(), SlotStatus::Busy);
        let id = slot.id;

        let result = store.insert(slot).await;
        assert!(result.is_ok());

        let fetched = store.get(id).await;
        let Ok(fetched) = fetched else {
            panic!("slot not found");
        };
        assert_eq!(fetched.id, id);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let store = SlotStore::new();
        let result = store.get(SlotId::new()).await;
        assert!(matches!(result, Err(MarketError::SlotNotFound(_))));
    }

    #[tokio::test]
    async fn insert_duplicate_returns_conflict() {
        let store = SlotStore::new();
        let slot = make_slot(UserId::new(), SlotStatus::Busy);
        let _ = store.insert(slot.clone()).await;
        let result = store.insert(slot).await;
        assert!(matches!(result, Err(MarketError::Conflict(_))));
    }

    #[tokio::test]
    async fn cas_succeeds_on_expected_status() {
        let store = SlotStore::new();
        let slot = make_slot(UserId::new(), SlotStatus::Swappable);
        let id = slot.id;
        let _ = store.insert(slot).await;

        let updated = store
            .compare_and_set_status(id, SlotStatus::Swappable, SlotStatus::SwapPending)
            .await;
        let Ok(updated) = updated else {
            panic!("cas failed");
        };
        assert_eq!(updated.status, SlotStatus::SwapPending);
    }

    #[tokio::test]
    async fn cas_fails_on_stale_expectation() {
        let store = SlotStore::new();
        let slot = make_slot(UserId::new(), SlotStatus::Busy);
        let id = slot.id;
        let _ = store.insert(slot).await;

        let result = store
            .compare_and_set_status(id, SlotStatus::Swappable, SlotStatus::SwapPending)
            .await;
        assert!(matches!(result, Err(MarketError::Conflict(_))));

        // The record is untouched.
        let Ok(slot) = store.get(id).await else {
            panic!("slot not found");
        };
        assert_eq!(slot.status, SlotStatus::Busy);
    }

    #[tokio::test]
    async fn cas_loser_of_race_gets_conflict() {
        let store = SlotStore::new();
        let slot = make_slot(UserId::new(), SlotStatus::Swappable);
        let id = slot.id;
        let _ = store.insert(slot).await;

        let (a, b) = tokio::join!(
            store.compare_and_set_status(id, SlotStatus::Swappable, SlotStatus::SwapPending),
            store.compare_and_set_status(id, SlotStatus::Swappable, SlotStatus::SwapPending),
        );
        assert_eq!(
            usize::from(a.is_ok()) + usize::from(b.is_ok()),
            1,
            "exactly one claim must win"
        );
    }

    #[tokio::test]
    async fn transfer_changes_owner_and_status_and_returns_prior() {
        let store = SlotStore::new();
        let old_owner = UserId::new();
        let new_owner = UserId::new();
        let slot = make_slot(old_owner, SlotStatus::SwapPending);
        let id = slot.id;
        let _ = store.insert(slot).await;

        let prior = store
            .transfer_ownership(id, new_owner, SlotStatus::Busy)
            .await;
        let Ok(prior) = prior else {
            panic!("transfer failed");
        };
        assert_eq!(prior.owner_id, old_owner);
        assert_eq!(prior.status, SlotStatus::SwapPending);

        let Ok(current) = store.get(id).await else {
            panic!("slot not found");
        };
        assert_eq!(current.owner_id, new_owner);
        assert_eq!(current.status, SlotStatus::Busy);
    }

    #[tokio::test]
    async fn transfer_nonexistent_returns_error() {
        let store = SlotStore::new();
        let result = store
            .transfer_ownership(SlotId::new(), UserId::new(), SlotStatus::Busy)
            .await;
        assert!(matches!(result, Err(MarketError::SlotNotFound(_))));
    }

    #[tokio::test]
    async fn list_open_filters_status_and_owner() {
        let store = SlotStore::new();
        let me = UserId::new();
        let other = UserId::new();

        let _ = store.insert(make_slot(other, SlotStatus::Swappable)).await;
        let _ = store.insert(make_slot(other, SlotStatus::Busy)).await;
        let _ = store.insert(make_slot(other, SlotStatus::SwapPending)).await;
        let _ = store.insert(make_slot(me, SlotStatus::Swappable)).await;

        let open = store.list_open(me).await;
        assert_eq!(open.len(), 1);
        let Some(slot) = open.first() else {
            panic!("empty listing");
        };
        assert_eq!(slot.owner_id, other);
        assert_eq!(slot.status, SlotStatus::Swappable);
    }

    #[tokio::test]
    async fn list_open_orders_by_start_time() {
        let store = SlotStore::new();
        let owner = UserId::new();
        let mut late = make_slot(owner, SlotStatus::Swappable);
        late.start_time = Utc::now() + chrono::Duration::hours(4);
        let mut early = make_slot(owner, SlotStatus::Swappable);
        early.start_time = Utc::now() + chrono::Duration::hours(1);
        let early_id = early.id;

        let _ = store.insert(late).await;
        let _ = store.insert(early).await;

        let open = store.list_open(UserId::new()).await;
        let Some(first) = open.first() else {
            panic!("empty listing");
        };
        assert_eq!(first.id, early_id);
    }

    #[tokio::test]
    async fn dump_and_seed_round_trip() {
        let store = SlotStore::new();
        let _ = store.insert(make_slot(UserId::new(), SlotStatus::Busy)).await;
        let _ = store
            .insert(make_slot(UserId::new(), SlotStatus::Swappable))
            .await;

        let dumped = store.dump().await;
        assert_eq!(dumped.len(), 2);

        let restored = SlotStore::new();
        restored.seed(dumped).await;
        assert_eq!(restored.len().await, 2);
        assert!(!restored.is_empty().await);
    }
}
