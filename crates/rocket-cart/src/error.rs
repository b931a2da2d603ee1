//! Cart error types.

use std::fmt;

use crate::catalog::LookupError;
use crate::config::Locale;
use crate::ids::ProductId;
use rocket_storage::StorageError;
use thiserror::Error;

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
            CartOperation::Update => "update",
        }
    }

    fn failure_message(self, locale: Locale) -> &'static str {
        match self {
            CartOperation::Add => locale.add_failed(),
            CartOperation::Remove => locale.remove_failed(),
            CartOperation::Update => locale.update_failed(),
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalog endpoint a failed lookup hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTarget {
    Stock,
    Catalog,
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupTarget::Stock => f.write_str("stock"),
            LookupTarget::Catalog => f.write_str("catalog"),
        }
    }
}

/// Errors that can occur in cart operations.
///
/// A failed operation never changes the cart.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested quantity is more than the stock on hand.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The product isn't in the cart.
    #[error("Cannot {operation} product {product_id}: not in cart")]
    NotInCart {
        operation: CartOperation,
        product_id: ProductId,
    },

    /// A catalog lookup failed.
    #[error("Cannot {operation} product: {target} lookup failed: {source}")]
    Lookup {
        operation: CartOperation,
        target: LookupTarget,
        #[source]
        source: LookupError,
    },

    /// The persisted cart couldn't be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// User-facing notification text.
    ///
    /// Stock and catalog lookup failures share one message per operation.
    pub fn message(&self, locale: Locale) -> &'static str {
        match self {
            CartError::StockExceeded { .. } => locale.stock_unavailable(),
            CartError::NotInCart { operation, .. } | CartError::Lookup { operation, .. } => {
                operation.failure_message(locale)
            }
            CartError::Storage(_) => locale.load_failed(),
        }
    }

    /// The operation that failed, if the error came from one.
    pub fn operation(&self) -> Option<CartOperation> {
        match self {
            CartError::NotInCart { operation, .. } | CartError::Lookup { operation, .. } => {
                Some(*operation)
            }
            CartError::StockExceeded { .. } | CartError::Storage(_) => None,
        }
    }
}
