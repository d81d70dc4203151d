//! Request/response DTOs for the REST API.

pub mod slot_dto;
pub mod swap_dto;

pub use slot_dto::{OpenSlotsResponse, SlotResponse, UpdateSlotListingRequest};
pub use swap_dto::{
    CreateSwapRequest, RequestFeedResponse, RespondToSwapRequest, SwapRequestResponse,
};
