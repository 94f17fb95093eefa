//! Outbound request construction.
//!
//! Every request the SDK sends carries the same client-identification
//! metadata, both as query parameters (the backend's edge reads those) and
//! as headers. The builder is the only place that knows about them.

use tracing::warn;

use super::{ApiRequest, Verb};

/// Engine identification reported to the backend.
const ENGINE_NAME: &str = "rust";
/// Tracks the workspace `rust-version`.
const ENGINE_VERSION: &str = "1.85";
/// SDK version reported to the backend.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which SDK surface a request originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkSurface {
    Store,
    Login,
}

impl SdkSurface {
    const fn query_name(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Login => "login",
        }
    }

    const fn header_name(self) -> &'static str {
        match self {
            Self::Store => "STORE",
            Self::Login => "LOGIN",
        }
    }
}

/// Builder for [`ApiRequest`] values.
pub struct RequestBuilder {
    url: String,
    verb: Verb,
    surface: SdkSurface,
    bearer: Option<String>,
    body: Option<String>,
    extra_headers: Vec<(String, String)>,
}

impl RequestBuilder {
    /// Start a request against `url` with the given verb.
    #[must_use]
    pub fn new(url: impl Into<String>, verb: Verb, surface: SdkSurface) -> Self {
        Self {
            url: url.into(),
            verb,
            surface,
            bearer: None,
            body: None,
            extra_headers: Vec::new(),
        }
    }

    /// Attach a bearer session token. Empty tokens are ignored so callers
    /// can pass through an optional credential unconditionally.
    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        if !token.is_empty() {
            self.bearer = Some(token.to_string());
        }
        self
    }

    /// Attach a pre-serialized JSON body.
    #[must_use]
    pub fn json_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an additional header (platform identity headers and similar).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Produce the fully-addressed request.
    #[must_use]
    pub fn build(self) -> ApiRequest {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}engine={}&engine_v={}&sdk={}&sdk_v={}",
            self.url,
            separator,
            ENGINE_NAME,
            ENGINE_VERSION,
            self.surface.query_name(),
            SDK_VERSION,
        );

        let mut headers = vec![
            ("X-ENGINE".to_string(), ENGINE_NAME.to_uppercase()),
            ("X-ENGINE-V".to_string(), ENGINE_VERSION.to_string()),
            ("X-SDK".to_string(), self.surface.header_name().to_string()),
            ("X-SDK-V".to_string(), SDK_VERSION.to_string()),
        ];

        if let Some(token) = &self.bearer {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        if self.body.is_some() {
            if self.verb == Verb::Get {
                warn!(url = %self.url, "request body attached to a GET request; did you mean POST?");
            }
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        headers.extend(self.extra_headers);

        ApiRequest {
            url,
            verb: self.verb,
            headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_appended_with_question_mark() {
        let request = RequestBuilder::new(
            "https://store.example/api/v2/project/p/items/virtual_items",
            Verb::Get,
            SdkSurface::Store,
        )
        .build();
        assert!(request.url.contains("/items/virtual_items?engine=rust&"));
        assert!(request.url.contains("&sdk=store&"));
    }

    #[test]
    fn test_metadata_appended_with_ampersand_when_query_present() {
        let request = RequestBuilder::new(
            "https://store.example/api/v1/project/p/items/groups?locale=en",
            Verb::Get,
            SdkSurface::Store,
        )
        .build();
        assert!(request.url.contains("?locale=en&engine=rust&"));
        // Exactly one '?' in the final URL.
        assert_eq!(request.url.matches('?').count(), 1);
    }

    #[test]
    fn test_identification_headers() {
        let request =
            RequestBuilder::new("https://login.example/api/login", Verb::Post, SdkSurface::Login)
                .build();
        assert_eq!(request.header("X-ENGINE"), Some("RUST"));
        assert_eq!(request.header("X-SDK"), Some("LOGIN"));
        assert_eq!(request.header("X-SDK-V"), Some(SDK_VERSION));
    }

    #[test]
    fn test_bearer_header() {
        let request = RequestBuilder::new("https://store.example", Verb::Get, SdkSurface::Store)
            .bearer("tok-123")
            .build();
        assert_eq!(request.header("Authorization"), Some("Bearer tok-123"));
    }

    #[test]
    fn test_empty_bearer_ignored() {
        let request = RequestBuilder::new("https://store.example", Verb::Get, SdkSurface::Store)
            .bearer("")
            .build();
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_body_sets_content_type() {
        let request = RequestBuilder::new("https://store.example", Verb::Post, SdkSurface::Store)
            .json_body(r#"{"quantity":1}"#.to_string())
            .build();
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"quantity":1}"#));
    }

    #[test]
    fn test_no_body_no_content_type() {
        let request =
            RequestBuilder::new("https://store.example", Verb::Get, SdkSurface::Store).build();
        assert_eq!(request.header("Content-Type"), None);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_extra_header_preserved() {
        let request = RequestBuilder::new("https://store.example", Verb::Post, SdkSurface::Store)
            .header("x-steam-userid", "7656119")
            .build();
        assert_eq!(request.header("x-steam-userid"), Some("7656119"));
    }
}
