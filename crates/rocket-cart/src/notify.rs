//! UI-boundary adapter that turns cart errors into notifications.

use std::sync::Arc;

use tokio::sync::watch;

use crate::cart::Cart;
use crate::catalog::CatalogService;
use crate::config::Locale;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::store::{CartStore, UpdateProductAmount};
use rocket_storage::KeyValueStore;

/// Sink for user-facing error messages (toasts, status lines, ...).
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = message, "cart notification");
    }
}

/// A cart handle for views.
///
/// Same operations as [`CartStore`], but failures are reported through the
/// notifier in the configured locale instead of being returned. Callers only
/// learn that something didn't happen.
pub struct NotifyingCart<C, S, N> {
    store: Arc<CartStore<C, S>>,
    notifier: N,
    locale: Locale,
}

impl<C, S, N> Clone for NotifyingCart<C, S, N>
where
    N: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            locale: self.locale,
        }
    }
}

impl<C, S, N> NotifyingCart<C, S, N>
where
    C: CatalogService,
    S: KeyValueStore,
    N: Notifier,
{
    pub fn new(store: Arc<CartStore<C, S>>, notifier: N) -> Self {
        let locale = store.config().locale;
        Self {
            store,
            notifier,
            locale,
        }
    }

    /// Current cart.
    pub fn cart(&self) -> Cart {
        self.store.cart()
    }

    /// Subscribe to cart changes.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.store.subscribe()
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<CartStore<C, S>> {
        &self.store
    }

    pub async fn add_product(&self, product_id: ProductId) {
        let result = self.store.add_product(product_id).await;
        self.report(result);
    }

    pub async fn remove_product(&self, product_id: ProductId) {
        let result = self.store.remove_product(product_id).await;
        self.report(result);
    }

    pub async fn update_product_amount(&self, update: UpdateProductAmount) {
        let result = self.store.update_product_amount(update).await;
        self.report(result);
    }

    fn report(&self, result: Result<(), CartError>) {
        if let Err(e) = result {
            let operation = e.operation().map_or("-", |op| op.as_str());
            tracing::debug!(error = %e, operation, "cart operation failed");
            self.notifier.error(e.message(self.locale));
        }
    }
}
