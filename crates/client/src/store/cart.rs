//! Cart reconciliation engine.
//!
//! Cart mutations are optimistic: the local mirror changes (and the update
//! event fires) at call time, before the backend confirms anything. The
//! network side runs through a single-flight queue - one worker task
//! consuming an unbounded channel - so requests against the cart dispatch
//! strictly in call order and two rapid mutations can never interleave
//! their server effects.
//!
//! Failure handling is asymmetric on purpose:
//!
//! - create/clear/refresh failures resolve the ticket with the error and
//!   leave local state alone;
//! - add/remove failures re-enqueue a full cart refresh at the queue tail,
//!   carrying the original ticket's responder. The caller's ticket then
//!   resolves with the refresh outcome, so a ticket may resolve `Ok` after
//!   a corrective resync rather than after the mutation itself. Callers
//!   rely on eventually observing success after transient failures, which
//!   is why this is not converted into an error-only path.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::ApiError;
use crate::http::builder::{RequestBuilder, SdkSurface};
use crate::http::{ApiRequest, Transport, Verb, classify, codec};
use crate::persist::{Persistence, SavedCart};

use super::types::{Cart, CartItem, CreatedCart, ItemsData, VirtualCurrencyPackage};

/// Mutable cart mirror plus the currency remembered across cart lifetimes.
#[derive(Debug, Clone, Default)]
pub(super) struct CartState {
    pub cart: Cart,
    pub currency: String,
}

/// Which cart operation a queued request performs; drives reconciliation on
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OpKind {
    Create,
    Clear,
    Refresh,
    AddItem,
    RemoveItem,
}

struct PendingOp {
    kind: OpKind,
    request: ApiRequest,
    /// Session token kept for a corrective refresh.
    token: String,
    responder: oneshot::Sender<Result<(), ApiError>>,
}

enum Command {
    Op(PendingOp),
    Shutdown,
}

/// Completion handle for a queued cart operation.
///
/// The operation runs whether or not the ticket is awaited; dropping the
/// ticket only discards the result. Resolves with an error if the owning
/// client is dropped first.
#[must_use = "the operation runs regardless, but errors are only visible through the ticket"]
pub struct CartTicket {
    rx: oneshot::Receiver<Result<(), ApiError>>,
}

impl CartTicket {
    /// A ticket that resolves immediately with a local error; used when an
    /// operation fails before anything can be queued.
    pub(super) fn failed(err: ApiError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self { rx }
    }
}

impl Future for CartTicket {
    type Output = Result<(), ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ApiError::client_dropped())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Everything the worker task needs, shared with the owning client.
pub(super) struct EngineShared {
    pub transport: Arc<dyn Transport>,
    pub persistence: Arc<dyn Persistence>,
    pub settings: Arc<Settings>,
    pub state: Arc<Mutex<CartState>>,
    pub events: broadcast::Sender<Cart>,
}

/// Handle to the single-flight queue.
pub(super) struct CartEngine {
    tx: mpsc::UnboundedSender<Command>,
}

impl CartEngine {
    /// Spawn the worker task. Must be called within a Tokio runtime.
    pub(super) fn spawn(shared: EngineShared) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        // The worker keeps its own sender so failed mutations can re-enqueue
        // a corrective refresh at the tail; shutdown is signalled explicitly.
        let requeue = tx.clone();
        tokio::spawn(run_worker(rx, requeue, shared));
        Self { tx }
    }

    /// Enqueue an operation at the tail of the queue.
    pub(super) fn submit(&self, kind: OpKind, request: ApiRequest, token: &str) -> CartTicket {
        let (responder, rx) = oneshot::channel();
        let op = PendingOp {
            kind,
            request,
            token: token.to_string(),
            responder,
        };
        // A send failure means the worker is gone; dropping the responder
        // resolves the ticket with a client-dropped error.
        let _ = self.tx.send(Command::Op(op));
        CartTicket { rx }
    }

    /// Stop the worker. Queued operations resolve as client-dropped.
    pub(super) fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Command>,
    requeue: mpsc::UnboundedSender<Command>,
    shared: EngineShared,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Shutdown => break,
            Command::Op(op) => handle_op(op, &requeue, &shared).await,
        }
    }
    debug!("cart worker stopped");
}

async fn handle_op(op: PendingOp, requeue: &mpsc::UnboundedSender<Command>, shared: &EngineShared) {
    let PendingOp {
        kind,
        request,
        token,
        responder,
    } = op;

    debug!(?kind, url = %request.url, "dispatching cart request");
    let classified = classify(shared.transport.execute(request).await);

    match kind {
        OpKind::Create => {
            let result =
                classified.and_then(|response| codec::decode::<CreatedCart>(&response));
            match result {
                Ok(created) => {
                    // A fresh cart discards any prior local items.
                    let snapshot = {
                        let mut state = lock(&shared.state);
                        state.cart = Cart::new(created.id);
                        shared.persistence.save_cart(&SavedCart {
                            cart_id: created.id,
                            currency: state.currency.clone(),
                        });
                        state.cart.clone()
                    };
                    let _ = shared.events.send(snapshot);
                    let _ = responder.send(Ok(()));
                }
                Err(err) => {
                    let _ = responder.send(Err(err));
                }
            }
        }
        // The local clear already happened at call time.
        OpKind::Clear => {
            let _ = responder.send(classified.map(|_| ()));
        }
        OpKind::Refresh => {
            let result = classified.and_then(|response| codec::decode::<Cart>(&response));
            match result {
                Ok(cart) => {
                    lock(&shared.state).cart = cart.clone();
                    let _ = shared.events.send(cart);
                    let _ = responder.send(Ok(()));
                }
                Err(err) => {
                    let _ = responder.send(Err(err));
                }
            }
        }
        OpKind::AddItem | OpKind::RemoveItem => match classified {
            Ok(_) => {
                let _ = responder.send(Ok(()));
            }
            Err(err) => {
                // Pull authoritative state instead of rolling back locally;
                // the original ticket resolves with the refresh outcome.
                warn!(error = %err, "cart mutation failed; scheduling corrective refresh");
                let cart_id = lock(&shared.state).cart.cart_id;
                let request = refresh_request(&shared.settings, cart_id, &token);
                let refresh = PendingOp {
                    kind: OpKind::Refresh,
                    request,
                    token,
                    responder,
                };
                let _ = requeue.send(Command::Op(refresh));
            }
        },
    }
}

/// Build the cart-fetch request used both by `refresh_cart` and the
/// corrective resync path.
pub(super) fn refresh_request(settings: &Settings, cart_id: i64, token: &str) -> ApiRequest {
    let url = format!(
        "{}/v1/project/{}/cart/{}",
        settings.store_api, settings.project_id, cart_id
    );
    RequestBuilder::new(url, Verb::Get, SdkSurface::Store)
        .bearer(token)
        .build()
}

/// Apply the optimistic half of an add-item call.
///
/// An existing line's quantity is overwritten (not accumulated); otherwise a
/// line is synthesized from the catalog, trying items before currency
/// packages. An unknown sku mutates nothing - the request still proceeds and
/// the server's view wins on the next sync.
pub(super) fn apply_add(
    cart: &mut Cart,
    catalog: &ItemsData,
    packages: &[VirtualCurrencyPackage],
    sku: &str,
    quantity: u32,
) {
    if let Some(line) = cart.items.iter_mut().find(|line| line.sku == sku) {
        line.quantity = quantity;
        return;
    }
    if let Some(item) = catalog.items.iter().find(|item| item.sku == sku) {
        cart.items.push(CartItem::from_store_item(item, quantity));
        return;
    }
    if let Some(package) = packages.iter().find(|package| package.sku == sku) {
        cart.items.push(CartItem::from_currency_package(package, quantity));
        return;
    }
    warn!(sku, "sku not found in local catalog; skipping optimistic cart update");
}

/// Apply the optimistic half of a remove-item call: delete the first line
/// matching the sku, no-op when absent.
pub(super) fn apply_remove(cart: &mut Cart, sku: &str) {
    if let Some(index) = cart.items.iter().position(|line| line.sku == sku) {
        cart.items.remove(index);
    }
}

/// Lock a mutex, recovering the data from a poisoned lock.
pub(super) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
