//! Persistent key-value storage for the RocketShoes cart.
//!
//! Provides a small synchronous storage seam with string values, plus typed
//! JSON helpers on top of it.
//!
//! - [`MemoryStore`]: process-local map, for tests and throwaway sessions
//! - [`FileStore`]: a JSON document on disk, rewritten atomically on change
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_storage::{FileStore, JsonStoreExt};
//!
//! let store = FileStore::open("cart.json")?;
//!
//! // Store a value
//! store.set_json("@RocketShoes:cart", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Vec<Product>> = store.get_json("@RocketShoes:cart")?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use kv::{JsonStoreExt, KeyValueStore};
pub use memory::MemoryStore;

