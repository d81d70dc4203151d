//! Service layer: negotiation business logic.
//!
//! [`SwapService`] coordinates the swap protocol over the domain stores
//! and emits events through the [`crate::domain::EventBus`].

pub mod swap_service;

pub use swap_service::SwapService;
