//! Persistence layer: PostgreSQL event log and market snapshots.
//!
//! Provides durable storage for swap events and periodic snapshots of the
//! in-memory stores. The concrete implementation uses `sqlx::PgPool` for
//! async PostgreSQL access; background tasks keep it off the request path.

pub mod models;
pub mod postgres;
pub mod tasks;

pub use postgres::PostgresPersistence;
