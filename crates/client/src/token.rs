//! Session token payload decoding.
//!
//! Login session tokens are JWT-shaped: three dot-delimited segments with a
//! base64 JSON payload in the middle. This module decodes that payload to
//! read identity claims used by platform-specific flows.
//!
//! No signature verification happens here or anywhere else in the SDK. The
//! payload is self-asserted data; callers must not treat these accessors as
//! a trust boundary.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

use crate::error::TokenError;

/// Claim holding the user identifier.
const CLAIM_SUBJECT: &str = "sub";
/// Claim naming the identity provider that issued the session.
const CLAIM_PROVIDER: &str = "provider";
/// Claim marking a master (cross-platform) account session.
const CLAIM_MASTER: &str = "is_master";

/// Decoded token payload with typed claim accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    payload: Map<String, Value>,
}

impl TokenClaims {
    /// Extract a named claim as a string. Absent or non-string claims read
    /// as the empty string.
    #[must_use]
    pub fn claim(&self, name: &str) -> String {
        self.payload
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// The subject (user id) claim.
    #[must_use]
    pub fn user_id(&self) -> String {
        self.claim(CLAIM_SUBJECT)
    }

    /// The identity-provider claim.
    #[must_use]
    pub fn provider(&self) -> String {
        self.claim(CLAIM_PROVIDER)
    }

    /// Whether the session is marked as a master account.
    #[must_use]
    pub fn is_master_account(&self) -> bool {
        self.payload
            .get(CLAIM_MASTER)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Raw access to a claim value for callers with non-string claims.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Decode the payload segment of a session token.
///
/// # Errors
///
/// [`TokenError::SegmentCount`] when the token is not three dot-delimited
/// segments, [`TokenError::Base64`] when the payload does not decode, and
/// [`TokenError::Json`] when the decoded bytes are not a JSON object.
pub fn decode_payload(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount);
    }
    let encoded = segments.get(1).copied().unwrap_or_default();

    // Tokens in the wild use the URL-safe alphabet; accept the standard one
    // with padding as well.
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| STANDARD.decode(encoded))
        .map_err(|_| TokenError::Base64)?;

    let value: Value = serde_json::from_slice(&bytes).map_err(|_| TokenError::Json)?;
    match value {
        Value::Object(payload) => Ok(TokenClaims { payload }),
        _ => Err(TokenError::Json),
    }
}
