//! Writes the cart to storage when it changes.

use std::sync::Mutex;

use crate::cart::Cart;
use rocket_storage::{JsonStoreExt, KeyValueStore, StorageError};

/// Persistence observer for one cart.
///
/// Remembers the last cart it wrote and only touches storage when the cart
/// it's shown differs from that.
#[derive(Debug)]
pub struct CartPersister<S> {
    storage: S,
    key: String,
    last: Mutex<Cart>,
}

impl<S: KeyValueStore> CartPersister<S> {
    /// Read the cart stored under `key`, or an empty cart if there is none.
    pub fn load(storage: S, key: impl Into<String>) -> Result<(Self, Cart), StorageError> {
        let key = key.into();
        let cart: Cart = storage.get_json(&key)?.unwrap_or_default();
        tracing::debug!(key = %key, items = cart.len(), "loaded cart");

        let persister = Self {
            storage,
            key,
            last: Mutex::new(cart.clone()),
        };
        Ok((persister, cart))
    }

    /// Persist `cart` if it differs from the last written value.
    ///
    /// Returns whether a write happened.
    pub fn observe(&self, cart: &Cart) -> Result<bool, StorageError> {
        let mut last = self.last.lock().map_err(|_| StorageError::Poisoned)?;
        if *last == *cart {
            return Ok(false);
        }

        self.storage.set_json(&self.key, cart)?;
        *last = cart.clone();
        tracing::debug!(key = %self.key, items = cart.len(), "persisted cart");
        Ok(true)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
