//! Wire records for the store API.
//!
//! These map the backend's JSON schema onto typed records. Collections are
//! replaced wholesale by their fetches, so everything here is plain data
//! with `Clone`; the cache slots in [`super::StoreClient`] hand out copies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tradewind_core::Price;

// =============================================================================
// Catalog
// =============================================================================

/// A purchasable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreItem {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Groups this item belongs to; empty for ungrouped items.
    #[serde(default)]
    pub groups: Vec<ItemGroup>,
    #[serde(default)]
    pub is_free: bool,
    /// Real-money price; absent for items sold only for virtual currency.
    #[serde(default)]
    pub price: Option<Price>,
    /// Virtual-currency prices, one per accepted currency.
    #[serde(default)]
    pub virtual_prices: Vec<VirtualPrice>,
    #[serde(default)]
    pub image_url: String,
}

/// Price of an item expressed in a virtual currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VirtualPrice {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: i64,
}

/// A catalog group (category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemGroup {
    /// Stable external identifier used for filtering.
    pub external_id: String,
    #[serde(default)]
    pub name: String,
}

/// Catalog snapshot: items plus the independently-fetched group list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemsData {
    #[serde(default)]
    pub items: Vec<StoreItem>,
    #[serde(default)]
    pub groups: Vec<ItemGroup>,
    /// External ids of every group referenced by at least one item.
    /// Recomputed locally after each item fetch, never sent by the server.
    #[serde(skip)]
    pub group_ids: BTreeSet<String>,
}

impl ItemsData {
    /// Rebuild [`Self::group_ids`] from the current item list.
    pub fn rebuild_group_ids(&mut self) {
        self.group_ids = self
            .items
            .iter()
            .flat_map(|item| item.groups.iter())
            .map(|group| group.external_id.clone())
            .collect();
    }
}

// =============================================================================
// Virtual currencies
// =============================================================================

/// A virtual currency definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VirtualCurrency {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// Response shape of the currency list fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VirtualCurrencyData {
    #[serde(default)]
    pub items: Vec<VirtualCurrency>,
}

/// Contents of a currency package (what the player receives).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurrencyPackageContent {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
}

/// A real-money package granting virtual currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VirtualCurrencyPackage {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub content: Vec<CurrencyPackageContent>,
}

/// Response shape of the package list fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VirtualCurrencyPackagesData {
    #[serde(default)]
    pub items: Vec<VirtualCurrencyPackage>,
}

/// A user's balance in one virtual currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurrencyBalance {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: i64,
}

/// Response shape of the balance fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CurrencyBalanceData {
    #[serde(default)]
    pub items: Vec<CurrencyBalance>,
}

// =============================================================================
// Inventory
// =============================================================================

/// An item instance the user owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InventoryItem {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    /// Present for instance-tracked (non-stackable) items.
    #[serde(default)]
    pub instance_id: Option<String>,
}

/// Inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Inventory {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CartItem {
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub quantity: u32,
}

impl CartItem {
    /// Synthesize a cart line from a catalog item for optimistic display.
    #[must_use]
    pub fn from_store_item(item: &StoreItem, quantity: u32) -> Self {
        Self {
            sku: item.sku.clone(),
            name: item.name.clone(),
            image_url: item.image_url.clone(),
            price: item.price.clone(),
            quantity,
        }
    }

    /// Synthesize a cart line from a currency package.
    #[must_use]
    pub fn from_currency_package(package: &VirtualCurrencyPackage, quantity: u32) -> Self {
        Self {
            sku: package.sku.clone(),
            name: package.name.clone(),
            image_url: package.image_url.clone(),
            price: package.price.clone(),
            quantity,
        }
    }
}

/// The cart mirror: server-issued id plus ordered line items.
///
/// `cart_id == 0` means no cart has been created or restored yet; item-level
/// mutations against it are the caller's error and surface as server 404s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    pub cart_id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Fresh empty cart with a server-issued id.
    #[must_use]
    pub const fn new(cart_id: i64) -> Self {
        Self {
            cart_id,
            items: Vec::new(),
        }
    }
}

/// Response shape of cart creation (`POST .../cart`), a bare id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCart {
    pub id: i64,
}

// =============================================================================
// Payments and orders
// =============================================================================

/// Response shape of payment-token creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentToken {
    /// Access token for the hosted payment form.
    pub token: String,
    pub order_id: i64,
}

/// Raw order-status response; status maps leniently to
/// [`tradewind_core::OrderStatus`].
#[derive(Debug, Clone, Deserialize)]
pub struct OrderWire {
    pub order_id: i64,
    #[serde(default)]
    pub status: String,
}

/// Response shape of a virtual-currency purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseWire {
    pub order_id: i64,
}

// =============================================================================
// Request payloads
// =============================================================================

/// Body of payment-token creation requests.
///
/// Locale fields are omitted entirely when unset; `sandbox` is always sent.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PaymentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub sandbox: bool,
}

/// Caller-facing purchase customization for payment-token requests.
#[derive(Debug, Clone, Default)]
pub struct PaymentOptions {
    /// Preferred payment currency (ISO 4217); backend default when `None`.
    pub currency: Option<String>,
    /// Two-letter country code steering payment methods.
    pub country: Option<String>,
    /// Interface locale for the payment form.
    pub locale: Option<String>,
}

/// Body of the consume-item request.
///
/// Per the consume contract a zero quantity and an empty instance id are
/// sent as explicit `null` fields, never omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumeRequest {
    pub sku: String,
    pub quantity: Option<u32>,
    pub instance_id: Option<String>,
}

/// Body of the add-to-cart request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartQuantity {
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_request_omits_empty_fields() {
        let body = serde_json::to_string(&PaymentRequest {
            currency: None,
            country: None,
            locale: Some("en".to_string()),
            sandbox: true,
        })
        .unwrap();
        assert_eq!(body, r#"{"locale":"en","sandbox":true}"#);
    }

    #[test]
    fn test_consume_request_sends_explicit_nulls() {
        let body = serde_json::to_string(&ConsumeRequest {
            sku: "potion".to_string(),
            quantity: None,
            instance_id: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"sku":"potion","quantity":null,"instance_id":null}"#);
    }

    #[test]
    fn test_consume_request_with_values() {
        let body = serde_json::to_string(&ConsumeRequest {
            sku: "potion".to_string(),
            quantity: Some(2),
            instance_id: Some("inst-9".to_string()),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"sku":"potion","quantity":2,"instance_id":"inst-9"}"#
        );
    }

    #[test]
    fn test_items_data_rebuilds_group_ids() {
        let mut data = ItemsData {
            items: vec![
                StoreItem {
                    sku: "a".to_string(),
                    groups: vec![
                        ItemGroup {
                            external_id: "weapons".to_string(),
                            name: "Weapons".to_string(),
                        },
                        ItemGroup {
                            external_id: "featured".to_string(),
                            name: "Featured".to_string(),
                        },
                    ],
                    ..StoreItem::default()
                },
                StoreItem {
                    sku: "b".to_string(),
                    groups: vec![ItemGroup {
                        external_id: "weapons".to_string(),
                        name: "Weapons".to_string(),
                    }],
                    ..StoreItem::default()
                },
            ],
            ..ItemsData::default()
        };
        data.rebuild_group_ids();
        assert_eq!(
            data.group_ids.iter().cloned().collect::<Vec<_>>(),
            vec!["featured".to_string(), "weapons".to_string()]
        );
    }

    #[test]
    fn test_cart_decodes_from_server_representation() {
        let cart: Cart = serde_json::from_str(
            r#"{"cart_id": 42, "items": [{"sku": "sword", "quantity": 2, "price": {"amount": 9.99, "currency": "USD"}}]}"#,
        )
        .unwrap();
        assert_eq!(cart.cart_id, 42);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 2);
    }
}
