//! Response classification.
//!
//! Single gate every completed exchange passes through before any domain
//! decoding. Success means "2xx with a response object"; everything else
//! becomes an [`ApiError`], preferring the backend's structured
//! `{statusCode, errorCode, errorMessage}` body when one is present.

use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

use super::{ApiResponse, TransportError};

/// Classify a completed exchange.
///
/// # Errors
///
/// - transport failure: `(204, 0, "No response")`
/// - non-2xx with a structured error body: the body's triple
/// - non-2xx with JSON lacking a string `errorMessage`: original status,
///   code 0, message naming the missing field
/// - non-2xx with a non-JSON body: original status, code 0,
///   "Can't deserialize error json"
pub fn classify(outcome: Result<ApiResponse, TransportError>) -> Result<ApiResponse, ApiError> {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "request failed without a response");
            return Err(ApiError::no_response());
        }
    };

    if response.is_success() {
        return Ok(response);
    }

    let mut http_status = response.status;
    let mut error_code = 0;
    let mut message = format!(
        "Invalid response. code={} error={}",
        response.status, response.body
    );

    // Example body: {"statusCode":403,"errorCode":0,"errorMessage":"Token not found"}
    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => {
            if let Some(error_message) = value.get("errorMessage").and_then(Value::as_str) {
                http_status = value
                    .get("statusCode")
                    .and_then(Value::as_u64)
                    .and_then(|status| u16::try_from(status).ok())
                    .unwrap_or(0);
                error_code = value
                    .get("errorCode")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                message = error_message.to_string();
            } else {
                message = "Can't deserialize error json: no field 'errorMessage' found".to_string();
            }
        }
        Err(_) => {
            message = "Can't deserialize error json".to_string();
        }
    }

    warn!(
        status = http_status,
        code = error_code,
        body = %response.body,
        "request failed: {message}"
    );

    Err(ApiError {
        http_status,
        error_code,
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_transport_failure_is_no_response() {
        let err = classify(Err(TransportError::Connection("refused".to_string()))).unwrap_err();
        assert_eq!(err, ApiError::no_response());
    }

    #[test]
    fn test_success_passes_through() {
        let ok = classify(response(200, r#"{"items":[]}"#)).unwrap();
        assert_eq!(ok.body, r#"{"items":[]}"#);
    }

    #[test]
    fn test_structured_error_overrides_status() {
        let body = r#"{"statusCode":403,"errorCode":1204,"errorMessage":"Token not found"}"#;
        let err = classify(response(401, body)).unwrap_err();
        assert_eq!(err.http_status, 403);
        assert_eq!(err.error_code, 1204);
        assert_eq!(err.message, "Token not found");
    }

    #[test]
    fn test_json_without_error_message_keeps_transport_status() {
        let err = classify(response(502, r#"{"detail":"upstream"}"#)).unwrap_err();
        assert_eq!(err.http_status, 502);
        assert_eq!(err.error_code, 0);
        assert_eq!(
            err.message,
            "Can't deserialize error json: no field 'errorMessage' found"
        );
    }

    #[test]
    fn test_non_string_error_message_treated_as_missing() {
        let err = classify(response(500, r#"{"errorMessage":42}"#)).unwrap_err();
        assert_eq!(err.http_status, 500);
        assert_eq!(
            err.message,
            "Can't deserialize error json: no field 'errorMessage' found"
        );
    }

    #[test]
    fn test_unparseable_body() {
        let err = classify(response(500, "<html>oops</html>")).unwrap_err();
        assert_eq!(err.http_status, 500);
        assert_eq!(err.error_code, 0);
        assert_eq!(err.message, "Can't deserialize error json");
    }

    #[test]
    fn test_redirect_is_an_error() {
        let err = classify(response(302, "")).unwrap_err();
        assert_eq!(err.http_status, 302);
    }
}
