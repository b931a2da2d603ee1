//! Catalog records and the remote catalog seam.

use crate::ids::ProductId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product as the catalog returns it from `GET /products/{id}`.
///
/// Fields the cart doesn't know about are kept in `extra` and written back
/// out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CatalogProduct {
    /// Create a catalog record with no extra fields.
    pub fn new(id: ProductId, title: impl Into<String>, price: f64, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Stock level from `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product this stock level belongs to.
    pub id: ProductId,
    /// Maximum purchasable quantity.
    pub amount: i64,
}

impl Stock {
    pub fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Check if a specific quantity can be bought.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity <= self.amount
    }

    /// Check if out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.amount <= 0
    }
}

/// Errors from a catalog lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The catalog has no such resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status other than 404.
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body couldn't be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Remote catalog the cart checks stock against and fetches products from.
///
/// Any `Err` is treated the same way by the cart: the lookup failed.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Current stock for a product.
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError>;

    /// Full catalog record for a product.
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, LookupError>;
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for std::sync::Arc<T> {
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        (**self).stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<CatalogProduct, LookupError> {
        (**self).product(id).await
    }
}
