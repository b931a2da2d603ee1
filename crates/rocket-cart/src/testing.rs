//! In-process catalog for store tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::cart::Product;
use crate::catalog::{CatalogProduct, CatalogService, LookupError, Stock};
use crate::ids::ProductId;
use crate::notify::Notifier;

pub(crate) fn record(id: u64) -> CatalogProduct {
    CatalogProduct::new(
        ProductId::new(id),
        format!("Tênis {id}"),
        179.9,
        format!("https://rocketshoes.test/{id}.jpg"),
    )
}

/// The line item a store builds for product `id` from [`FakeCatalog`].
pub(crate) fn shoe(id: u64, amount: i64) -> Product {
    Product::from_catalog(record(id), amount)
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    stock: HashMap<u64, i64>,
    stock_ids: HashMap<u64, u64>,
    products: HashMap<u64, CatalogProduct>,
    delay: Option<Duration>,
    fail_stock: AtomicBool,
    stock_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_product(mut self, id: u64, stock: i64) -> Self {
        self.stock.insert(id, stock);
        self.products.insert(id, record(id));
        self
    }

    /// Stock is known but the catalog has no record.
    pub(crate) fn with_stock_only(mut self, id: u64, stock: i64) -> Self {
        self.stock.insert(id, stock);
        self
    }

    /// Looking up `id` returns the record of `target`.
    pub(crate) fn with_alias(mut self, id: u64, target: u64) -> Self {
        self.stock.insert(id, 5);
        self.products.insert(id, record(target));
        self
    }

    /// Stock for `id` comes back labelled as `reported`.
    pub(crate) fn with_mislabelled_stock(mut self, id: u64, reported: u64) -> Self {
        self.stock.insert(id, 5);
        self.stock_ids.insert(id, reported);
        self.products.insert(id, record(id));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn fail_stock_lookups(&self) {
        self.fail_stock.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.fail_stock.load(Ordering::SeqCst) {
            return Err(LookupError::Transport("connection reset".into()));
        }
        self.stock
            .get(&id.get())
            .map(|amount| {
                let reported = self.stock_ids.get(&id.get()).map_or(id, |r| ProductId::new(*r));
                Stock::new(reported, *amount)
            })
            .ok_or_else(|| LookupError::NotFound(format!("/stock/{id}")))
    }

    async fn product(&self, id: ProductId) -> Result<CatalogProduct, LookupError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        self.products
            .get(&id.get())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("/products/{id}")))
    }
}

/// Notifier that remembers every message.
#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
