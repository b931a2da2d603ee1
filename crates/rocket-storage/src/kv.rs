//! The storage seam and its typed JSON helpers.

use std::sync::Arc;

use crate::StorageError;
use serde::{de::DeserializeOwned, Serialize};

/// Synchronous string key-value store.
///
/// Values are opaque strings; callers that want structured data go through
/// [`JsonStoreExt`].
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value for `key`, or `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set the raw value for `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        (**self).exists(key)
    }
}

/// JSON serialization on top of any [`KeyValueStore`].
///
/// # Example
///
/// ```rust,ignore
/// store.set_json("@RocketShoes:cart", &cart)?;
/// let cart: Option<Vec<Product>> = store.get_json("@RocketShoes:cart")?;
/// ```
pub trait JsonStoreExt: KeyValueStore {
    /// Get and deserialize a value. Returns `None` if the key doesn't exist.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}
