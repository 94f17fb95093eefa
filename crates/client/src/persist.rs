//! Local persistence collaborator.
//!
//! The SDK does not own save-data storage; the host injects an opaque
//! key-value style collaborator. Two records are persisted: the cart
//! id/currency pair (restored on construction, written after a successful
//! cart creation) and the remembered login session.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Persisted cart identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SavedCart {
    pub cart_id: i64,
    pub currency: String,
}

/// Persisted login session (only written when the user opted into
/// "remember me").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SavedLogin {
    pub token: String,
}

/// Opaque persistence collaborator.
///
/// Implementations decide where and how data lands (platform save-data,
/// keychain, a file). Methods are synchronous; implementations that need
/// async storage should buffer writes themselves.
pub trait Persistence: Send + Sync {
    fn load_cart(&self) -> Option<SavedCart>;
    fn save_cart(&self, cart: &SavedCart);
    fn load_login(&self) -> Option<SavedLogin>;
    fn save_login(&self, login: &SavedLogin);
    /// Remove any persisted login session.
    fn clear_login(&self);
}

/// In-memory persistence.
///
/// Default collaborator when the host injects nothing; also what tests use.
/// Contents vanish with the process, which matches "no remember me".
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    cart: Option<SavedCart>,
    login: Option<SavedLogin>,
}

impl Persistence for MemoryPersistence {
    fn load_cart(&self) -> Option<SavedCart> {
        self.inner.lock().ok().and_then(|inner| inner.cart.clone())
    }

    fn save_cart(&self, cart: &SavedCart) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.cart = Some(cart.clone());
        }
    }

    fn load_login(&self) -> Option<SavedLogin> {
        self.inner.lock().ok().and_then(|inner| inner.login.clone())
    }

    fn save_login(&self, login: &SavedLogin) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.login = Some(login.clone());
        }
    }

    fn clear_login(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.login = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_round_trip() {
        let persistence = MemoryPersistence::default();
        assert!(persistence.load_cart().is_none());

        let saved = SavedCart {
            cart_id: 42,
            currency: "USD".to_string(),
        };
        persistence.save_cart(&saved);
        assert_eq!(persistence.load_cart(), Some(saved));
    }

    #[test]
    fn test_clear_login() {
        let persistence = MemoryPersistence::default();
        persistence.save_login(&SavedLogin {
            token: "tok".to_string(),
        });
        assert!(persistence.load_login().is_some());
        persistence.clear_login();
        assert!(persistence.load_login().is_none());
    }
}
