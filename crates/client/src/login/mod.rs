//! Login client: registration, authentication, session state, user
//! attributes, and account linking.
//!
//! The session token arrives inside a redirect URL (`login_url`) whose
//! `token` query parameter carries the JWT-shaped session token. The client
//! stores it, persists it when the user opted into "remember me", and
//! exposes it for store calls. Claims can be read (not verified) with
//! [`crate::token`].

pub mod types;

pub use types::{LoginData, TargetPlatform, UserAttribute};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use crate::config::Settings;
use crate::error::ApiError;
use crate::http::builder::{RequestBuilder, SdkSurface};
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, Transport, Verb, classify, codec};
use crate::persist::{MemoryPersistence, Persistence, SavedLogin};

use types::{
    AttributesGetRequest, AttributesModifyRequest, AttributesRemoveRequest, AuthRequest,
    AuthResponse, CrossAuthRequest, LinkAccountRequest, LinkingCodeResponse, RegisterRequest,
    ResetPasswordRequest, SocialUrlResponse, ValidateRequest,
};

/// Client for the login API.
///
/// Cheap to clone; clones share session state and the attribute cache.
#[derive(Clone)]
pub struct LoginClient {
    inner: Arc<LoginInner>,
}

struct LoginInner {
    settings: Arc<Settings>,
    transport: Arc<dyn Transport>,
    persistence: Arc<dyn Persistence>,
    session: Mutex<Option<LoginData>>,
    attributes: Mutex<Vec<UserAttribute>>,
}

impl LoginClient {
    /// Create a client with the default transport and in-memory persistence.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_collaborators(
            settings,
            Arc::new(ReqwestTransport::new()),
            Arc::new(MemoryPersistence::default()),
        )
    }

    /// Create a client with injected collaborators. A remembered session,
    /// if persisted, is restored here.
    #[must_use]
    pub fn with_collaborators(
        settings: Settings,
        transport: Arc<dyn Transport>,
        persistence: Arc<dyn Persistence>,
    ) -> Self {
        let session = persistence.load_login().map(|saved| LoginData {
            token: SecretString::from(saved.token),
            remember_me: true,
        });

        Self {
            inner: Arc::new(LoginInner {
                settings: Arc::new(settings),
                transport,
                persistence,
                session: Mutex::new(session),
                attributes: Mutex::new(Vec::new()),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}/{}{}projectId={}",
            self.inner.settings.login_api, path, separator, self.inner.settings.login_id
        )
    }

    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        classify(self.inner.transport.execute(request).await)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new user. The user receives an account confirmation email;
    /// no session is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), ApiError> {
        let payload = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        let request = RequestBuilder::new(self.url("user"), Verb::Post, SdkSurface::Login)
            .json_body(codec::encode(&payload)?)
            .build();
        self.request(request).await.map(|_| ())
    }

    /// Authenticate with username and password. On success the session
    /// token is stored, and persisted iff `remember_me`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response carries no
    /// token.
    #[instrument(skip(self, password))]
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginData, ApiError> {
        let payload = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
            remember_me,
        };
        let request = RequestBuilder::new(self.url("login"), Verb::Post, SdkSurface::Login)
            .json_body(codec::encode(&payload)?)
            .build();
        let response = self.request(request).await?;
        let auth: AuthResponse = codec::decode(&response)?;
        let token = extract_token(&auth.login_url, response.status)?;
        Ok(self.store_session(token, remember_me))
    }

    /// Validate the stored session token against the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is present or the request fails.
    #[instrument(skip(self))]
    pub async fn validate_token(&self) -> Result<(), ApiError> {
        let token = self
            .login_data()
            .ok_or_else(|| ApiError::local("no session token to validate"))?;
        let payload = ValidateRequest {
            token: token.token.expose_secret().to_string(),
        };
        let request =
            RequestBuilder::new(self.url("token/validate"), Verb::Post, SdkSurface::Login)
                .json_body(codec::encode(&payload)?)
                .build();
        self.request(request).await.map(|_| ())
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, username: &str) -> Result<(), ApiError> {
        let payload = ResetPasswordRequest {
            username: username.to_string(),
        };
        let request = RequestBuilder::new(
            self.url("password/reset/request"),
            Verb::Post,
            SdkSurface::Login,
        )
        .json_body(codec::encode(&payload)?)
        .build();
        self.request(request).await.map(|_| ())
    }

    /// Fetch the URL of a social network's login form for the host to open
    /// in a browser. The resulting token reaches the SDK via
    /// [`Self::set_token`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn social_auth_url(&self, provider: &str) -> Result<String, ApiError> {
        let url = self.url(&format!("social/{provider}/login_url"));
        let request = RequestBuilder::new(url, Verb::Get, SdkSurface::Login).build();
        let response = self.request(request).await?;
        let social: SocialUrlResponse = codec::decode(&response)?;
        Ok(social.url)
    }

    /// Exchange a platform session ticket for a session token (cross-auth).
    /// The session is stored but never persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response carries no
    /// token.
    #[instrument(skip(self, session_ticket))]
    pub async fn authenticate_with_session_ticket(
        &self,
        provider: &str,
        session_ticket: &str,
        app_id: &str,
    ) -> Result<LoginData, ApiError> {
        let payload = CrossAuthRequest {
            session_ticket: session_ticket.to_string(),
            app_id: app_id.to_string(),
        };
        let url = self.url(&format!("social/{provider}/cross_auth"));
        let request = RequestBuilder::new(url, Verb::Post, SdkSurface::Login)
            .json_body(codec::encode(&payload)?)
            .build();
        let response = self.request(request).await?;
        let auth: AuthResponse = codec::decode(&response)?;
        let token = extract_token(&auth.login_url, response.status)?;
        Ok(self.store_session(token, false))
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// Install a token obtained outside this client (social auth browser
    /// flow). Not persisted.
    pub fn set_token(&self, token: &str) {
        *lock(&self.inner.session) = Some(LoginData {
            token: SecretString::from(token.to_string()),
            remember_me: false,
        });
    }

    /// Current session, if any.
    #[must_use]
    pub fn login_data(&self) -> Option<LoginData> {
        lock(&self.inner.session).clone()
    }

    /// Clear the session and any persisted copy of it.
    pub fn drop_login_data(&self) {
        *lock(&self.inner.session) = None;
        self.inner.persistence.clear_login();
    }

    fn store_session(&self, token: String, remember_me: bool) -> LoginData {
        let data = LoginData {
            token: SecretString::from(token.clone()),
            remember_me,
        };
        *lock(&self.inner.session) = Some(data.clone());
        if remember_me {
            self.inner.persistence.save_login(&SavedLogin { token });
        } else {
            self.inner.persistence.clear_login();
        }
        data
    }

    // =========================================================================
    // User attributes
    // =========================================================================

    /// Fetch user attributes (all of them when `keys` is empty), replacing
    /// the local attribute cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn fetch_user_attributes(
        &self,
        token: &str,
        user_id: &str,
        keys: &[String],
    ) -> Result<Vec<UserAttribute>, ApiError> {
        let payload = AttributesGetRequest {
            keys: keys.to_vec(),
            user_id: (!user_id.is_empty()).then(|| user_id.to_string()),
        };
        let request = RequestBuilder::new(self.url("attributes/get"), Verb::Post, SdkSurface::Login)
            .bearer(token)
            .json_body(codec::encode(&payload)?)
            .build();
        let response = self.request(request).await?;
        let attributes: Vec<UserAttribute> = codec::decode(&response)?;

        *lock(&self.inner.attributes) = attributes.clone();
        Ok(attributes)
    }

    /// Create or edit user attributes server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn modify_user_attributes(
        &self,
        token: &str,
        attributes: Vec<UserAttribute>,
    ) -> Result<(), ApiError> {
        let payload = AttributesModifyRequest { attributes };
        let request =
            RequestBuilder::new(self.url("attributes/update"), Verb::Post, SdkSurface::Login)
                .bearer(token)
                .json_body(codec::encode(&payload)?)
                .build();
        self.request(request).await.map(|_| ())
    }

    /// Remove user attributes by key server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_user_attributes(
        &self,
        token: &str,
        keys: &[String],
    ) -> Result<(), ApiError> {
        let payload = AttributesRemoveRequest {
            keys: keys.to_vec(),
        };
        let request =
            RequestBuilder::new(self.url("attributes/remove"), Verb::Post, SdkSurface::Login)
                .bearer(token)
                .json_body(codec::encode(&payload)?)
                .build();
        self.request(request).await.map(|_| ())
    }

    /// Cached attribute list from the last successful fetch.
    #[must_use]
    pub fn user_attributes(&self) -> Vec<UserAttribute> {
        lock(&self.inner.attributes).clone()
    }

    // =========================================================================
    // Account linking
    // =========================================================================

    /// Create a code for linking a platform account to this master account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn create_account_linking_code(&self, token: &str) -> Result<String, ApiError> {
        let request = RequestBuilder::new(self.url("account/code"), Verb::Post, SdkSurface::Login)
            .bearer(token)
            .build();
        let response = self.request(request).await?;
        let linking: LinkingCodeResponse = codec::decode(&response)?;
        Ok(linking.code)
    }

    /// Link a platform account to the master account that issued `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn link_account(
        &self,
        user_id: &str,
        platform: TargetPlatform,
        code: &str,
    ) -> Result<(), ApiError> {
        let payload = LinkAccountRequest {
            user_id: user_id.to_string(),
            platform: platform.as_str().to_string(),
            code: code.to_string(),
        };
        let request = RequestBuilder::new(self.url("account/link"), Verb::Post, SdkSurface::Login)
            .json_body(codec::encode(&payload)?)
            .build();
        self.request(request).await.map(|_| ())
    }
}

/// Pull the `token` query parameter out of a redirect URL.
fn extract_token(login_url: &str, http_status: u16) -> Result<String, ApiError> {
    let parsed = Url::parse(login_url).map_err(|_| ApiError {
        http_status,
        error_code: 0,
        message: "Can't parse login URL".to_string(),
    })?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ApiError {
            http_status,
            error_code: 0,
            message: "Can't find token in login URL".to_string(),
        })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
