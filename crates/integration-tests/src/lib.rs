//! Shared support for the end-to-end tests in `tests/`.
//!
//! These tests exercise the SDK through its real `reqwest` transport
//! against a `wiremock` server, covering the HTTP layer the unit tests
//! bypass with scripted transports.

#![cfg_attr(not(test), forbid(unsafe_code))]

use tradewind_client::Settings;
use wiremock::MockServer;

/// Settings pointing both API bases at a mock server.
#[must_use]
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::new("proj-it", "login-it");
    settings.store_api = format!("{}/api", server.uri());
    settings.login_api = format!("{}/login-api", server.uri());
    settings
}
