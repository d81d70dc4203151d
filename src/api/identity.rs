//! Caller identity extraction.
//!
//! The service does not issue sessions itself; an upstream layer
//! authenticates the caller and forwards the resulting user ID in the
//! `x-user-id` header. [`CallerIdentity`] extracts and validates it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::MarketError;

/// Name of the header carrying the upstream-authenticated user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
///
/// Extraction fails with [`MarketError::Unauthorized`] (401) when the
/// header is absent or is not a valid UUID.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(
    /// The upstream-authenticated user ID.
    pub UserId,
);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| uuid::Uuid::parse_str(value).ok())
            .map(|uuid| Self(UserId::from_uuid(uuid)))
            .ok_or(MarketError::Unauthorized)
    }
}
