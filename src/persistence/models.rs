//! Database models for the swap event log and market snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored event row from the `swap_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSwapEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// The record the event is about — a swap request for negotiation
    /// events, a slot for listing events.
    pub subject_id: Uuid,
    /// Event type discriminator (e.g. `"request_accepted"`).
    pub event_type: String,
    /// JSONB payload with event-specific data.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A snapshot row from the `market_snapshots` table: the full contents of
/// both stores at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// All slot records as a JSONB array.
    pub slots_json: serde_json::Value,
    /// All swap request records as a JSONB array.
    pub requests_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
