//! Type-safe identifiers for slots, swap requests, and users.
//!
//! Each identifier is a newtype wrapper around [`uuid::Uuid`] (v4) so the
//! three ID spaces cannot be confused with one another at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a calendar slot.
///
/// Wraps a UUID v4. Assigned once when the slot record is created and
/// immutable thereafter. Used as the dictionary key in
/// [`super::SlotStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SlotId(uuid::Uuid);

impl SlotId {
    /// Creates a new random `SlotId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `SlotId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

/// Unique identifier for a swap request.
///
/// Wraps a UUID v4. Used as the dictionary key in
/// [`super::RequestStore`] and as the correlation ID in domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// Creates a new random `RequestId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `RequestId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

/// Unique identifier for a user.
///
/// Wraps a UUID v4. The service never mints these itself — identity is
/// established upstream and arrives in the `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(uuid::Uuid);

impl UserId {
    /// Creates a new random `UserId` (UUID v4). Primarily useful in tests.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `UserId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

macro_rules! impl_id_conversions {
    ($name:ident) => {
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

impl_id_conversions!(SlotId);
impl_id_conversions!(RequestId);
impl_id_conversions!(UserId);
