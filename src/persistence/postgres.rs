//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{MarketSnapshot, StoredSwapEvent};
use crate::config::ServiceConfig;
use crate::error::MarketError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
///
/// Durability sidecar to the in-memory stores: an append-only event log of
/// every [`crate::domain::SwapEvent`] plus periodic full-state snapshots.
/// The latest snapshot re-seeds the stores at startup.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL using the pool settings from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::Unavailable`] if the database cannot be
    /// reached within the configured timeout.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, MarketError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| MarketError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on migration failure.
    pub async fn run_migrations(&self) -> Result<(), MarketError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        subject_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, MarketError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO swap_events (subject_id, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(subject_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Saves a full-state snapshot of both stores.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn save_snapshot(
        &self,
        slots_json: &serde_json::Value,
        requests_json: &serde_json::Value,
    ) -> Result<i64, MarketError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO market_snapshots (slots_json, requests_json) \
             VALUES ($1, $2) RETURNING id",
        )
        .bind(slots_json)
        .bind(requests_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshot(&self) -> Result<Option<MarketSnapshot>, MarketError> {
        let row = sqlx::query_as::<
            _,
            (i64, serde_json::Value, serde_json::Value, DateTime<Utc>),
        >(
            "SELECT id, slots_json, requests_json, snapshot_at \
             FROM market_snapshots ORDER BY snapshot_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(row.map(|(id, slots_json, requests_json, snapshot_at)| MarketSnapshot {
            id,
            slots_json,
            requests_json,
            snapshot_at,
        }))
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// subject ID.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        subject_id: Option<Uuid>,
    ) -> Result<Vec<StoredSwapEvent>, MarketError> {
        let rows = if let Some(sid) = subject_id {
            sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, subject_id, event_type, payload, created_at FROM swap_events \
                 WHERE created_at > $1 AND subject_id = $2 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(sid)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, subject_id, event_type, payload, created_at FROM swap_events \
                 WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, subject_id, event_type, payload, created_at)| StoredSwapEvent {
                    id,
                    subject_id,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`MarketError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, MarketError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM market_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
