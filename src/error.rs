//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{RequestId, SlotId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "swap request ... has already been resolved",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`MarketError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation / auth | 400 / 401 / 403              |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 / 503                    |
/// | 4000–4999 | Negotiation       | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Request payload failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No caller identity was supplied, or it could not be parsed.
    #[error("unauthorized: missing or malformed caller identity")]
    Unauthorized,

    /// The caller lacks the role required for the action.
    #[error("forbidden: caller is not entitled to act on this resource")]
    Forbidden,

    /// Slot with the given ID was not found.
    #[error("slot not found: {0}")]
    SlotNotFound(SlotId),

    /// Swap request with the given ID was not found.
    #[error("swap request not found: {0}")]
    RequestNotFound(RequestId),

    /// The swap request is no longer `PENDING`; no new action occurred.
    #[error("swap request {0} has already been resolved")]
    AlreadyResolved(RequestId),

    /// A concurrent mutation invalidated an expected precondition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced slot is missing, not owned by the caller, or not in
    /// the status the operation requires.
    #[error("invalid slot: {0}")]
    InvalidSlot(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The backing store is unreachable; the caller may retry.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized => 1002,
            Self::Forbidden => 1003,
            Self::SlotNotFound(_) => 2001,
            Self::RequestNotFound(_) => 2002,
            Self::AlreadyResolved(_) => 2003,
            Self::Conflict(_) => 2004,
            Self::InvalidSlot(_) => 4001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unavailable(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::SlotNotFound(_) | Self::RequestNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyResolved(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidSlot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) | Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            MarketError::InvalidRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(MarketError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(MarketError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            MarketError::SlotNotFound(SlotId::new()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            MarketError::AlreadyResolved(RequestId::new()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarketError::Conflict("x".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarketError::InvalidSlot("x".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            MarketError::Unavailable("x".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            MarketError::InvalidRequest("x".to_string()).error_code(),
            MarketError::Unauthorized.error_code(),
            MarketError::Forbidden.error_code(),
            MarketError::SlotNotFound(SlotId::new()).error_code(),
            MarketError::RequestNotFound(RequestId::new()).error_code(),
            MarketError::AlreadyResolved(RequestId::new()).error_code(),
            MarketError::Conflict("x".to_string()).error_code(),
            MarketError::InvalidSlot("x".to_string()).error_code(),
            MarketError::Internal("x".to_string()).error_code(),
            MarketError::PersistenceError("x".to_string()).error_code(),
            MarketError::Unavailable("x".to_string()).error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn display_includes_offending_id() {
        let id = RequestId::new();
        let message = MarketError::AlreadyResolved(id).to_string();
        assert!(message.contains(&id.to_string()));
    }
}
