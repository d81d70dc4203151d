//! Domain layer: core records, stores, access guard, and event system.
//!
//! This module contains the marketplace domain model: typed identifiers,
//! the [`Slot`] and [`SwapRequest`] records with their status state
//! machines, the concurrent stores with compare-and-set primitives, the
//! authorization predicates, and the event bus broadcasting state changes.

pub mod access;
pub mod event_bus;
pub mod id;
pub mod request_store;
pub mod slot;
pub mod slot_store;
pub mod swap_event;
pub mod swap_request;

pub use event_bus::EventBus;
pub use id::{RequestId, SlotId, UserId};
pub use request_store::RequestStore;
pub use slot::{Slot, SlotStatus};
pub use slot_store::SlotStore;
pub use swap_event::SwapEvent;
pub use swap_request::{RequestFeed, RequestStatus, SwapRequest};
