//! Cart and line item types.

use crate::catalog::CatalogProduct;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A line item: a catalog product plus the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID, unique within a cart.
    pub id: ProductId,
    /// Product title (denormalized for display).
    #[serde(default)]
    pub title: String,
    /// Unit price as the catalog reports it.
    #[serde(default)]
    pub price: f64,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Quantity. Always positive while the item is in a cart.
    pub amount: i64,
    /// Any other catalog fields, carried through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Build a line item from a catalog record.
    pub fn from_catalog(product: CatalogProduct, amount: i64) -> Self {
        let CatalogProduct {
            id,
            title,
            price,
            image,
            mut extra,
        } = product;
        extra.remove("amount");
        Self {
            id,
            title,
            price,
            image,
            amount,
            extra,
        }
    }
}

/// An ordered collection of line items.
///
/// Items stay in the order they were first added. Serializes as a plain JSON
/// array of products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Get an item by product ID.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity of a product, 0 if absent.
    pub fn amount_of(&self, id: ProductId) -> i64 {
        self.get(id).map(|p| p.amount).unwrap_or(0)
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|p| p.amount).sum()
    }

    /// Set the quantity of an existing item. Returns `false` if it's absent.
    pub(crate) fn set_amount(&mut self, id: ProductId, amount: i64) -> bool {
        match self.items.iter_mut().find(|p| p.id == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Append a new item at the end.
    pub(crate) fn push(&mut self, product: Product) {
        debug_assert!(!self.contains(product.id));
        self.items.push(product);
    }

    /// Remove an item by product ID.
    pub(crate) fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.items.iter().position(|p| p.id == id)?;
        Some(self.items.remove(index))
    }
}

impl From<Vec<Product>> for Cart {
    fn from(items: Vec<Product>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
