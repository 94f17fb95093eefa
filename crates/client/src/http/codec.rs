//! JSON codec helpers for classified responses and request payloads.
//!
//! Decoding is two-phase so failures classify precisely: text that is not
//! JSON at all reports a deserialize failure, JSON that does not map onto
//! the expected record reports a schema mismatch. Both carry the response's
//! HTTP status.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::error::ApiError;

use super::ApiResponse;

/// Decode a classified (2xx) response body into a typed record.
///
/// # Errors
///
/// [`ApiError::deserialize`] for invalid JSON, [`ApiError::schema_mismatch`]
/// when required fields cannot be mapped.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(&response.body).map_err(|err| {
        error!(error = %err, body = %response.body, "response body is not valid JSON");
        ApiError::deserialize(response.status)
    })?;

    serde_json::from_value(value).map_err(|err| {
        error!(error = %err, body = %response.body, "response body does not match expected shape");
        ApiError::schema_mismatch(response.status)
    })
}

/// Serialize a request payload to a JSON body string.
///
/// # Errors
///
/// Returns a local [`ApiError`]; payload types in this crate cannot actually
/// fail to serialize, so this only fires on a bug.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload)
        .map_err(|err| ApiError::local(format!("Can't serialize request body: {err}")))
}
