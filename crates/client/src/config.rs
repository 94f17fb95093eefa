//! SDK configuration.
//!
//! Hosts usually construct [`Settings`] directly with project identifiers
//! from their build system. [`Settings::from_env`] exists for tools and
//! tests that configure themselves from the environment.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TRADEWIND_PROJECT_ID` - Store project identifier
//! - `TRADEWIND_LOGIN_ID` - Login project identifier
//!
//! ## Optional
//! - `TRADEWIND_STORE_API` - Store API base URL (default: production)
//! - `TRADEWIND_LOGIN_API` - Login API base URL (default: production)
//! - `TRADEWIND_SANDBOX` - `true` to request sandbox payment tokens
//! - `TRADEWIND_STEAM_IDENTITY` - `true` to attach the Steam identity header
//!   to payment-token requests

use thiserror::Error;

/// Default production store API base.
pub const DEFAULT_STORE_API: &str = "https://store.tradewind.games/api";
/// Default production login API base.
pub const DEFAULT_LOGIN_API: &str = "https://login.tradewind.games/api";
/// Host serving the live payment form.
pub const PAYMENT_HOST: &str = "secure.tradewind.games";
/// Host serving the sandbox payment form.
pub const SANDBOX_PAYMENT_HOST: &str = "sandbox-secure.tradewind.games";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// SDK configuration shared by the store and login clients.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Store project identifier; scopes every store API path.
    pub project_id: String,
    /// Login project identifier; sent as a query parameter on login calls.
    pub login_id: String,
    /// Store API base URL, without a trailing slash.
    pub store_api: String,
    /// Login API base URL, without a trailing slash.
    pub login_api: String,
    /// Request sandbox payment tokens and the sandbox payment form.
    pub sandbox: bool,
    /// Derive an `x-steam-userid` header from the session token on
    /// payment-token requests (builds shipping through Steam).
    pub steam_identity: bool,
}

impl Settings {
    /// Create settings for the production backend.
    #[must_use]
    pub fn new(project_id: impl Into<String>, login_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            login_id: login_id.into(),
            store_api: DEFAULT_STORE_API.to_string(),
            login_api: DEFAULT_LOGIN_API.to_string(),
            sandbox: false,
            steam_identity: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or boolean
    /// flags fail to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            project_id: get_required_env("TRADEWIND_PROJECT_ID")?,
            login_id: get_required_env("TRADEWIND_LOGIN_ID")?,
            store_api: get_env_or_default("TRADEWIND_STORE_API", DEFAULT_STORE_API),
            login_api: get_env_or_default("TRADEWIND_LOGIN_API", DEFAULT_LOGIN_API),
            sandbox: get_bool_env("TRADEWIND_SANDBOX")?,
            steam_identity: get_bool_env("TRADEWIND_STEAM_IDENTITY")?,
        })
    }

    /// Host of the payment form matching the sandbox flag.
    #[must_use]
    pub fn payment_host(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_PAYMENT_HOST
        } else {
            PAYMENT_HOST
        }
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional boolean flag, absent meaning `false`.
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(false),
        Ok(raw) => raw
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
