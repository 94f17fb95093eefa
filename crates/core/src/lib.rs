//! Tradewind Core - Shared types library.
//!
//! This crate provides common types used across the Tradewind SDK components:
//! - `client` - The commerce/identity client SDK
//! - `cli` - Command-line smoke-test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Prices and order status values shared by the wire model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
