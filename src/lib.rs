//! # slotswap
//!
//! REST API service for a calendar-slot swap marketplace: users list
//! calendar slots as swappable, browse other users' open slots, and
//! negotiate pairwise exchanges through a request/accept/reject workflow.
//!
//! The core is the swap negotiation protocol — the state machine over
//! {slot status, request status} with an all-or-nothing guarantee for
//! every multi-record transition.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── SwapService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── SlotStore / RequestStore (domain/)
//!     │
//!     └── PostgreSQL Persistence (event log + snapshots)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
