//! Store client: catalog, inventory, cart, and purchase operations.
//!
//! [`StoreClient`] owns the last-known server state (catalog, currencies,
//! packages, inventory, balances, cart) and every store-side operation.
//! Cache slots are only written by successful responses; fetches replace
//! their slot wholesale rather than merging.
//!
//! Cart mutations are special: they apply optimistically and serialize
//! through the single-flight queue in [`cart`]. Everything else runs
//! independently and concurrently - two fetches may complete in either
//! order, each overwriting only its own slot.

pub mod cart;
pub mod types;

pub use cart::CartTicket;

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use tradewind_core::OrderStatus;

use crate::config::Settings;
use crate::error::ApiError;
use crate::http::builder::{RequestBuilder, SdkSurface};
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, Transport, Verb, classify, codec};
use crate::persist::{MemoryPersistence, Persistence};
use crate::token;

use cart::{CartEngine, CartState, EngineShared, OpKind, lock};
use types::{
    Cart, CartQuantity, ConsumeRequest, CurrencyBalance, CurrencyBalanceData, Inventory,
    ItemsData, OrderWire, PaymentOptions, PaymentRequest, PaymentToken, PurchaseWire, StoreItem,
    VirtualCurrency, VirtualCurrencyData, VirtualCurrencyPackage, VirtualCurrencyPackagesData,
};

/// A checked payment order: id plus lenient status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub order_id: i64,
    pub status: OrderStatus,
}

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the store API.
///
/// Cheap to clone; all clones share the same cached state and cart queue.
/// Construct inside a Tokio runtime - the cart worker task is spawned
/// eagerly so queued mutations dispatch even when nobody awaits them.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    settings: Arc<Settings>,
    transport: Arc<dyn Transport>,
    persistence: Arc<dyn Persistence>,
    catalog: Mutex<ItemsData>,
    currencies: Mutex<Vec<VirtualCurrency>>,
    packages: Mutex<Vec<VirtualCurrencyPackage>>,
    balances: Mutex<Vec<CurrencyBalance>>,
    inventory: Mutex<Inventory>,
    cart: Arc<Mutex<CartState>>,
    events: broadcast::Sender<Cart>,
    engine: CartEngine,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.engine.shutdown();
    }
}

impl StoreClient {
    /// Create a client with the default transport and in-memory persistence.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_collaborators(
            settings,
            Arc::new(ReqwestTransport::new()),
            Arc::new(MemoryPersistence::default()),
        )
    }

    /// Create a client with injected transport and persistence collaborators.
    ///
    /// The saved `{cart_id, currency}` pair, if any, is restored here so
    /// cart operations address the previous cart.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_collaborators(
        settings: Settings,
        transport: Arc<dyn Transport>,
        persistence: Arc<dyn Persistence>,
    ) -> Self {
        let settings = Arc::new(settings);
        let saved = persistence.load_cart();
        let state = CartState {
            cart: Cart::new(saved.as_ref().map_or(0, |saved| saved.cart_id)),
            currency: saved.map_or_else(|| "USD".to_string(), |saved| saved.currency),
        };
        let cart_state = Arc::new(Mutex::new(state));
        let (events, _) = broadcast::channel(64);

        let engine = CartEngine::spawn(EngineShared {
            transport: transport.clone(),
            persistence: persistence.clone(),
            settings: settings.clone(),
            state: cart_state.clone(),
            events: events.clone(),
        });

        Self {
            inner: Arc::new(StoreInner {
                settings,
                transport,
                persistence,
                catalog: Mutex::new(ItemsData::default()),
                currencies: Mutex::new(Vec::new()),
                packages: Mutex::new(Vec::new()),
                balances: Mutex::new(Vec::new()),
                inventory: Mutex::new(Inventory::default()),
                cart: cart_state,
                events,
                engine,
            }),
        }
    }

    fn url_v1(&self, path: &str) -> String {
        format!(
            "{}/v1/project/{}/{}",
            self.inner.settings.store_api, self.inner.settings.project_id, path
        )
    }

    fn url_v2(&self, path: &str) -> String {
        format!(
            "{}/v2/project/{}/{}",
            self.inner.settings.store_api, self.inner.settings.project_id, path
        )
    }

    /// Execute a request and run it through the classification gate.
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        classify(self.inner.transport.execute(request).await)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the item catalog, replacing the cached item list and
    /// recomputing which group ids items reference. The independently
    /// fetched group list is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn fetch_virtual_items(&self) -> Result<(), ApiError> {
        let request =
            RequestBuilder::new(self.url_v2("items/virtual_items"), Verb::Get, SdkSurface::Store)
                .build();
        let response = self.request(request).await?;
        let data: ItemsData = codec::decode(&response)?;

        let mut catalog = lock(&self.inner.catalog);
        catalog.items = data.items;
        catalog.rebuild_group_ids();
        debug!(items = catalog.items.len(), "catalog items replaced");
        Ok(())
    }

    /// Fetch the group list for a locale (empty means `en`), replacing only
    /// the group sub-collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn fetch_item_groups(&self, locale: &str) -> Result<(), ApiError> {
        let used_locale = if locale.is_empty() { "en" } else { locale };
        let url = self.url_v1(&format!("items/groups?locale={used_locale}"));
        let request = RequestBuilder::new(url, Verb::Get, SdkSurface::Store).build();
        let response = self.request(request).await?;
        let data: ItemsData = codec::decode(&response)?;

        lock(&self.inner.catalog).groups = data.groups;
        Ok(())
    }

    /// Fetch the virtual currency list, replacing the cached slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn fetch_virtual_currencies(&self) -> Result<(), ApiError> {
        let request = RequestBuilder::new(
            self.url_v2("items/virtual_currency"),
            Verb::Get,
            SdkSurface::Store,
        )
        .build();
        let response = self.request(request).await?;
        let data: VirtualCurrencyData = codec::decode(&response)?;

        *lock(&self.inner.currencies) = data.items;
        Ok(())
    }

    /// Fetch the currency package list, replacing the cached slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn fetch_virtual_currency_packages(&self) -> Result<(), ApiError> {
        let request = RequestBuilder::new(
            self.url_v2("items/virtual_currency/package"),
            Verb::Get,
            SdkSurface::Store,
        )
        .build();
        let response = self.request(request).await?;
        let data: VirtualCurrencyPackagesData = codec::decode(&response)?;

        *lock(&self.inner.packages) = data.items;
        Ok(())
    }

    /// Fetch the authenticated user's inventory, replacing the cached slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn fetch_inventory(&self, token: &str) -> Result<(), ApiError> {
        let request = RequestBuilder::new(
            self.url_v2("user/inventory/items"),
            Verb::Get,
            SdkSurface::Store,
        )
        .bearer(token)
        .build();
        let response = self.request(request).await?;
        let data: Inventory = codec::decode(&response)?;

        *lock(&self.inner.inventory) = data;
        Ok(())
    }

    /// Fetch the authenticated user's currency balances, replacing the
    /// cached slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn fetch_currency_balance(&self, token: &str) -> Result<(), ApiError> {
        let request = RequestBuilder::new(
            self.url_v2("user/virtual_currency_balance"),
            Verb::Get,
            SdkSurface::Store,
        )
        .bearer(token)
        .build();
        let response = self.request(request).await?;
        let data: CurrencyBalanceData = codec::decode(&response)?;

        *lock(&self.inner.balances) = data.items;
        Ok(())
    }

    /// Look up a single virtual currency by sku. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn virtual_currency_by_sku(&self, sku: &str) -> Result<VirtualCurrency, ApiError> {
        let url = self.url_v2(&format!("items/virtual_currency/sku/{sku}"));
        let request = RequestBuilder::new(url, Verb::Get, SdkSurface::Store).build();
        let response = self.request(request).await?;
        codec::decode(&response)
    }

    /// Look up a single currency package by sku. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn currency_package_by_sku(
        &self,
        sku: &str,
    ) -> Result<VirtualCurrencyPackage, ApiError> {
        let url = self.url_v2(&format!("items/virtual_currency/package/sku/{sku}"));
        let request = RequestBuilder::new(url, Verb::Get, SdkSurface::Store).build();
        let response = self.request(request).await?;
        codec::decode(&response)
    }

    // =========================================================================
    // Payments and orders
    // =========================================================================

    /// Create a payment token for a single item purchase.
    ///
    /// Returns the access token for the hosted payment form plus the order
    /// id to poll with [`Self::check_order`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body does not decode, or
    /// (on Steam-identity builds) the session token payload does not decode.
    #[instrument(skip(self, token))]
    pub async fn fetch_payment_token(
        &self,
        token: &str,
        item_sku: &str,
        options: &PaymentOptions,
    ) -> Result<PaymentToken, ApiError> {
        let url = self.url_v1(&format!("payment/item/{item_sku}"));
        self.fetch_payment_token_at(token, url, options).await
    }

    /// Create a payment token for the current cart.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::fetch_payment_token`].
    #[instrument(skip(self, token))]
    pub async fn fetch_cart_payment_token(
        &self,
        token: &str,
        options: &PaymentOptions,
    ) -> Result<PaymentToken, ApiError> {
        let cart_id = lock(&self.inner.cart).cart.cart_id;
        let url = self.url_v1(&format!("payment/cart/{cart_id}"));
        self.fetch_payment_token_at(token, url, options).await
    }

    async fn fetch_payment_token_at(
        &self,
        token: &str,
        url: String,
        options: &PaymentOptions,
    ) -> Result<PaymentToken, ApiError> {
        let payload = PaymentRequest {
            currency: options.currency.clone().filter(|value| !value.is_empty()),
            country: options.country.clone().filter(|value| !value.is_empty()),
            locale: options.locale.clone().filter(|value| !value.is_empty()),
            sandbox: self.inner.settings.sandbox,
        };

        let mut builder = RequestBuilder::new(url, Verb::Post, SdkSurface::Store)
            .bearer(token)
            .json_body(codec::encode(&payload)?);

        if self.inner.settings.steam_identity {
            builder = builder.header("x-steam-userid", steam_user_id(token)?);
        }

        let response = self.request(builder.build()).await?;
        codec::decode(&response)
    }

    /// URL of the hosted payment form for an access token, honoring the
    /// sandbox flag.
    #[must_use]
    pub fn payment_url(&self, access_token: &str) -> String {
        format!(
            "https://{}/payment?access_token={access_token}",
            self.inner.settings.payment_host()
        )
    }

    /// Check the status of a payment order.
    ///
    /// Unrecognized status strings map to [`OrderStatus::Unknown`] with a
    /// logged warning; they are not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn check_order(&self, token: &str, order_id: i64) -> Result<Order, ApiError> {
        let url = self.url_v1(&format!("order/{order_id}"));
        let request = RequestBuilder::new(url, Verb::Get, SdkSurface::Store)
            .bearer(token)
            .build();
        let response = self.request(request).await?;
        let wire: OrderWire = codec::decode(&response)?;

        let status = OrderStatus::from_wire(&wire.status).unwrap_or_else(|| {
            warn!(status = %wire.status, order_id = wire.order_id, "unknown order status");
            OrderStatus::Unknown
        });

        Ok(Order {
            order_id: wire.order_id,
            status,
        })
    }

    /// Consume an inventory item. A zero quantity and an empty instance id
    /// are sent as explicit nulls per the consume contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn consume_item(
        &self,
        token: &str,
        sku: &str,
        quantity: u32,
        instance_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let payload = ConsumeRequest {
            sku: sku.to_string(),
            quantity: (quantity > 0).then_some(quantity),
            instance_id: instance_id
                .filter(|id| !id.is_empty())
                .map(ToString::to_string),
        };
        let request = RequestBuilder::new(
            self.url_v1("user/inventory/item/consume"),
            Verb::Post,
            SdkSurface::Store,
        )
        .bearer(token)
        .json_body(codec::encode(&payload)?)
        .build();

        self.request(request).await.map(|_| ())
    }

    /// Buy an item with virtual currency; returns the order id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, token))]
    pub async fn buy_with_virtual_currency(
        &self,
        token: &str,
        item_sku: &str,
        currency_sku: &str,
    ) -> Result<i64, ApiError> {
        let url = self.url_v2(&format!("payment/item/{item_sku}/virtual/{currency_sku}"));
        let request = RequestBuilder::new(url, Verb::Post, SdkSurface::Store)
            .bearer(token)
            .build();
        let response = self.request(request).await?;
        let wire: PurchaseWire = codec::decode(&response)?;
        Ok(wire.order_id)
    }

    // =========================================================================
    // Cart operations (queued, optimistic)
    // =========================================================================

    /// Create a fresh server cart. On success the local cart is replaced
    /// with the new empty cart, the `{cart_id, currency}` pair is persisted,
    /// and the update event fires.
    pub fn create_cart(&self, token: &str) -> CartTicket {
        let request = RequestBuilder::new(self.url_v1("cart"), Verb::Post, SdkSurface::Store)
            .bearer(token)
            .build();
        self.inner.engine.submit(OpKind::Create, request, token)
    }

    /// Clear the cart. The local item list empties immediately; the server
    /// outcome only resolves the ticket.
    pub fn clear_cart(&self, token: &str) -> CartTicket {
        let cart_id = lock(&self.inner.cart).cart.cart_id;
        let url = self.url_v1(&format!("cart/{cart_id}/clear"));
        let request = RequestBuilder::new(url, Verb::Put, SdkSurface::Store)
            .bearer(token)
            .build();
        let ticket = self.inner.engine.submit(OpKind::Clear, request, token);

        let snapshot = {
            let mut state = lock(&self.inner.cart);
            state.cart.items.clear();
            state.cart.clone()
        };
        let _ = self.inner.events.send(snapshot);
        ticket
    }

    /// Fetch the authoritative cart, replacing the local mirror wholesale
    /// on success.
    pub fn refresh_cart(&self, token: &str) -> CartTicket {
        let cart_id = lock(&self.inner.cart).cart.cart_id;
        let request = cart::refresh_request(&self.inner.settings, cart_id, token);
        self.inner.engine.submit(OpKind::Refresh, request, token)
    }

    /// Put `quantity` of a sku in the cart. The local line is created or
    /// overwritten (never accumulated) before the request dispatches; a
    /// sku unknown to the catalog mutates nothing locally but the request
    /// still proceeds. On server failure the engine resyncs with a cart
    /// refresh that resolves this ticket.
    pub fn add_to_cart(&self, token: &str, sku: &str, quantity: u32) -> CartTicket {
        let body = match codec::encode(&CartQuantity { quantity }) {
            Ok(body) => body,
            Err(err) => return CartTicket::failed(err),
        };
        let cart_id = lock(&self.inner.cart).cart.cart_id;
        let url = self.url_v1(&format!("cart/{cart_id}/item/{sku}"));
        let request = RequestBuilder::new(url, Verb::Put, SdkSurface::Store)
            .bearer(token)
            .json_body(body)
            .build();
        let ticket = self.inner.engine.submit(OpKind::AddItem, request, token);

        let snapshot = {
            let catalog = lock(&self.inner.catalog);
            let packages = lock(&self.inner.packages);
            let mut state = lock(&self.inner.cart);
            cart::apply_add(&mut state.cart, &catalog, &packages, sku, quantity);
            state.cart.clone()
        };
        let _ = self.inner.events.send(snapshot);
        ticket
    }

    /// Remove the first cart line matching the sku. Removing an absent sku
    /// leaves the cart unchanged but still dispatches the request. On
    /// server failure the engine resyncs with a cart refresh that resolves
    /// this ticket.
    pub fn remove_from_cart(&self, token: &str, sku: &str) -> CartTicket {
        let cart_id = lock(&self.inner.cart).cart.cart_id;
        let url = self.url_v1(&format!("cart/{cart_id}/item/{sku}"));
        let request = RequestBuilder::new(url, Verb::Delete, SdkSurface::Store)
            .bearer(token)
            .build();
        let ticket = self.inner.engine.submit(OpKind::RemoveItem, request, token);

        let snapshot = {
            let mut state = lock(&self.inner.cart);
            cart::apply_remove(&mut state.cart, sku);
            state.cart.clone()
        };
        let _ = self.inner.events.send(snapshot);
        ticket
    }

    /// Subscribe to cart update events. Events fire synchronously on every
    /// optimistic mutation and on every authoritative replacement.
    #[must_use]
    pub fn subscribe_cart(&self) -> broadcast::Receiver<Cart> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Cached state accessors
    // =========================================================================

    /// Catalog items, optionally filtered by group external id.
    #[must_use]
    pub fn virtual_items(&self, group_filter: &str) -> Vec<StoreItem> {
        let catalog = lock(&self.inner.catalog);
        if group_filter.is_empty() {
            catalog.items.clone()
        } else {
            catalog
                .items
                .iter()
                .filter(|item| {
                    item.groups
                        .iter()
                        .any(|group| group.external_id == group_filter)
                })
                .cloned()
                .collect()
        }
    }

    /// Catalog items that belong to no group.
    #[must_use]
    pub fn virtual_items_without_group(&self) -> Vec<StoreItem> {
        lock(&self.inner.catalog)
            .items
            .iter()
            .filter(|item| item.groups.is_empty())
            .cloned()
            .collect()
    }

    /// Full catalog snapshot (items, groups, referenced group ids).
    #[must_use]
    pub fn items_data(&self) -> ItemsData {
        lock(&self.inner.catalog).clone()
    }

    /// Cached virtual currency list.
    #[must_use]
    pub fn virtual_currencies(&self) -> Vec<VirtualCurrency> {
        lock(&self.inner.currencies).clone()
    }

    /// Cached currency package list.
    #[must_use]
    pub fn virtual_currency_packages(&self) -> Vec<VirtualCurrencyPackage> {
        lock(&self.inner.packages).clone()
    }

    /// Cached currency balances.
    #[must_use]
    pub fn currency_balances(&self) -> Vec<CurrencyBalance> {
        lock(&self.inner.balances).clone()
    }

    /// Cached inventory snapshot.
    #[must_use]
    pub fn inventory(&self) -> Inventory {
        lock(&self.inner.inventory).clone()
    }

    /// Current cart mirror.
    #[must_use]
    pub fn cart(&self) -> Cart {
        lock(&self.inner.cart).cart.clone()
    }

    /// Currency associated with the cart (persisted alongside the id).
    #[must_use]
    pub fn cart_currency(&self) -> String {
        lock(&self.inner.cart).currency.clone()
    }
}

/// Derive the Steam user id from the session token: the `id` claim holds a
/// profile URL whose last path segment is the numeric id.
fn steam_user_id(token: &str) -> Result<String, ApiError> {
    let claims = token::decode_payload(token)
        .map_err(|_| ApiError::local("Can't parse token payload"))?;
    let profile_url = claims.claim("id");
    if profile_url.is_empty() {
        return Err(ApiError::local(
            "Can't find Steam profile ID in token payload",
        ));
    }
    let id = profile_url
        .rfind('/')
        .and_then(|index| profile_url.get(index + 1..))
        .unwrap_or_default();
    Ok(id.to_string())
}
