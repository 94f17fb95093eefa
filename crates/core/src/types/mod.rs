//! Core types for the Tradewind SDK.
//!
//! This module provides the small set of domain concepts shared between the
//! client crate and its consumers.

pub mod price;
pub mod status;

pub use price::Price;
pub use status::OrderStatus;
