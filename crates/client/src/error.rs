//! Error types surfaced by the SDK.
//!
//! Every network-bound operation fails with an [`ApiError`] carrying the
//! `(http_status, error_code, message)` triple the backend uses in its error
//! bodies. Local failures (token decode inside a payment flow, dropped
//! client) reuse the same shape with a zero status so callers handle one
//! type everywhere.

use thiserror::Error;

/// Sentinel status reported when the transport produced no response at all.
pub const NO_RESPONSE_STATUS: u16 = 204;

/// Structured failure for any backend-facing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {http_status}, code {error_code})")]
pub struct ApiError {
    /// HTTP status the failure was classified under. `204` means the
    /// transport delivered no response; `0` means the failure was local.
    pub http_status: u16,
    /// Application-level error code from the backend, `0` when absent.
    pub error_code: i64,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Transport delivered no response (connection failure, aborted request).
    #[must_use]
    pub fn no_response() -> Self {
        Self {
            http_status: NO_RESPONSE_STATUS,
            error_code: 0,
            message: "No response".to_string(),
        }
    }

    /// A 2xx response body was not valid JSON.
    #[must_use]
    pub fn deserialize(http_status: u16) -> Self {
        Self {
            http_status,
            error_code: 0,
            message: "Can't deserialize server response".to_string(),
        }
    }

    /// A 2xx response body was valid JSON but did not match the expected
    /// record shape.
    #[must_use]
    pub fn schema_mismatch(http_status: u16) -> Self {
        Self {
            http_status,
            error_code: 0,
            message: "Can't convert server response to struct".to_string(),
        }
    }

    /// A failure that happened before any request was dispatched.
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            http_status: 0,
            error_code: 0,
            message: message.into(),
        }
    }

    /// The owning client was dropped before the queued operation ran.
    #[must_use]
    pub fn client_dropped() -> Self {
        Self::local("store client dropped before the request completed")
    }
}

/// Failure decoding the payload segment of a login session token.
///
/// Decoding is a plain read of self-asserted data; no signature check is
/// performed, so none of these variants say anything about token validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token did not have exactly three dot-delimited segments.
    #[error("token must have three dot-delimited segments")]
    SegmentCount,
    /// The payload segment was not valid base64.
    #[error("token payload is not valid base64")]
    Base64,
    /// The decoded payload was not a JSON object.
    #[error("token payload is not a JSON object")]
    Json,
}
