//! Background persistence tasks.
//!
//! The negotiation engine never blocks on the database: the event log
//! writer subscribes to the [`EventBus`] like any other observer, and the
//! snapshot loop periodically dumps both stores. Either task failing is
//! logged and retried on the next event/tick; the in-memory stores remain
//! the source of truth.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::PostgresPersistence;
use crate::domain::{Slot, SwapEvent, SwapRequest};
use crate::error::MarketError;
use crate::service::SwapService;

/// Re-seeds the stores from the most recent snapshot, if one exists.
///
/// Returns `true` when a snapshot was restored.
///
/// # Errors
///
/// Returns a [`MarketError::PersistenceError`] when the snapshot cannot
/// be read or decoded.
pub async fn restore_from_snapshot(
    persistence: &PostgresPersistence,
    service: &SwapService,
) -> Result<bool, MarketError> {
    let Some(snapshot) = persistence.load_latest_snapshot().await? else {
        return Ok(false);
    };

    let slots: Vec<Slot> = serde_json::from_value(snapshot.slots_json)
        .map_err(|e| MarketError::PersistenceError(format!("bad slot snapshot: {e}")))?;
    let requests: Vec<SwapRequest> = serde_json::from_value(snapshot.requests_json)
        .map_err(|e| MarketError::PersistenceError(format!("bad request snapshot: {e}")))?;

    tracing::info!(
        slots = slots.len(),
        requests = requests.len(),
        snapshot_at = %snapshot.snapshot_at,
        "restoring market state from snapshot"
    );
    service.slots().seed(slots).await;
    service.requests().seed(requests).await;
    Ok(true)
}

/// Spawns the event-log writer: every [`SwapEvent`] published on the bus
/// is appended to the `swap_events` table.
pub fn spawn_event_log_writer(
    persistence: PostgresPersistence,
    mut events: broadcast::Receiver<SwapEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_value(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize swap event");
                            continue;
                        }
                    };
                    if let Err(e) = persistence
                        .save_event(event.subject_id(), event.event_type_str(), &payload)
                        .await
                    {
                        tracing::error!(error = %e, event_type = event.event_type_str(), "failed to append swap event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log writer lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Spawns the snapshot loop: dumps both stores every `interval_secs` and
/// prunes snapshots older than `cleanup_after_days` (0 disables pruning).
pub fn spawn_snapshot_loop(
    persistence: PostgresPersistence,
    service: Arc<SwapService>,
    interval_secs: u64,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // The first tick fires immediately; skip it so we snapshot on the
        // interval, not at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;

            let slots = service.slots().dump().await;
            let requests = service.requests().dump().await;
            let (Ok(slots_json), Ok(requests_json)) = (
                serde_json::to_value(&slots),
                serde_json::to_value(&requests),
            ) else {
                tracing::error!("failed to serialize market snapshot");
                continue;
            };

            match persistence.save_snapshot(&slots_json, &requests_json).await {
                Ok(id) => tracing::debug!(snapshot_id = id, "market snapshot saved"),
                Err(e) => tracing::error!(error = %e, "failed to save market snapshot"),
            }

            if cleanup_after_days > 0 {
                match persistence.delete_old_snapshots(cleanup_after_days).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::debug!(deleted, "pruned old snapshots");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "snapshot cleanup failed"),
                }
            }
        }
    })
}
