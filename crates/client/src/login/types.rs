//! Wire records for the login API.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// =============================================================================
// Session
// =============================================================================

/// The current login session.
#[derive(Debug, Clone)]
pub struct LoginData {
    /// Opaque bearer session token. Decode claims with
    /// [`crate::token::decode_payload`]; never treat them as verified.
    pub token: SecretString,
    /// Whether the user asked for the session to be persisted.
    pub remember_me: bool,
}

/// Platform a secondary account lives on, for account linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    PlaystationNetwork,
    XboxLive,
    NintendoShop,
    PcStandalone,
}

impl TargetPlatform {
    /// Wire name of the platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlaystationNetwork => "playstation_network",
            Self::XboxLive => "xbox_live",
            Self::NintendoShop => "nintendo_shop",
            Self::PcStandalone => "pc_standalone",
        }
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Debug, Serialize)]
pub(super) struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AuthRequest {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ValidateRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ResetPasswordRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CrossAuthRequest {
    pub session_ticket: String,
    pub app_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AttributesGetRequest {
    /// Keys to fetch; empty fetches everything.
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AttributesModifyRequest {
    pub attributes: Vec<UserAttribute>,
}

#[derive(Debug, Serialize)]
pub(super) struct AttributesRemoveRequest {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkAccountRequest {
    pub user_id: String,
    pub platform: String,
    pub code: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Login and cross-auth responses carry a redirect URL whose `token` query
/// parameter is the session token.
#[derive(Debug, Deserialize)]
pub(super) struct AuthResponse {
    pub login_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SocialUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LinkingCodeResponse {
    pub code: String,
}

/// A user attribute (publisher-defined key/value with a permission level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserAttribute {
    pub key: String,
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub value: String,
}
