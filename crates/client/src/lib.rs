//! Tradewind client SDK.
//!
//! A game embeds this crate to talk to the Tradewind commerce and identity
//! backend: authenticate players, mirror the store catalog, manage a shopping
//! cart, and drive purchases up to the hosted payment form.
//!
//! # Architecture
//!
//! - [`StoreClient`](store::StoreClient) owns the catalog/inventory/cart
//!   mirror and every store-side operation. Cart mutations go through a
//!   single-flight queue so their network effects apply in call order.
//! - [`LoginClient`](login::LoginClient) owns the login session and user
//!   attributes.
//! - The HTTP layer is injected through the [`Transport`](http::Transport)
//!   trait; [`ReqwestTransport`](http::ReqwestTransport) is the default.
//!   Tests inject scripted transports instead of a live server.
//! - Local persistence (saved cart id, remembered session) is injected
//!   through the [`Persistence`](persist::Persistence) trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use tradewind_client::{Settings, StoreClient};
//!
//! let client = StoreClient::new(Settings::new("my-project", "my-login"));
//!
//! client.fetch_virtual_items().await?;
//! let ticket = client.create_cart(&token);
//! ticket.await?;
//! client.add_to_cart(&token, "booster-pack", 3).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod http;
pub mod login;
pub mod persist;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, Settings};
pub use error::{ApiError, TokenError};
pub use http::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError, Verb};
pub use login::LoginClient;
pub use persist::{MemoryPersistence, Persistence, SavedCart, SavedLogin};
pub use store::StoreClient;
