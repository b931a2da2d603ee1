//! Shopping cart store for the RocketShoes storefront.
//!
//! This crate tracks which products a shopper has picked and how many of
//! each, checks every quantity change against the catalog's stock, and keeps
//! a persisted copy of the cart so it survives reloads.
//!
//! - **Cart**: ordered line items ([`Product`]) keyed by [`ProductId`]
//! - **Catalog**: the [`CatalogService`] seam for stock and product lookups
//! - **Store**: [`CartStore`] with `add_product`, `remove_product` and
//!   `update_product_amount`
//! - **Notifications**: [`NotifyingCart`] reports failures to a [`Notifier`]
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart::prelude::*;
//! use rocket_storage::FileStore;
//!
//! let storage = FileStore::open("cart.json")?;
//! let store = CartStore::open(catalog, storage, CartConfig::default())?;
//!
//! store.add_product(ProductId::new(10)).await?;
//! store
//!     .update_product_amount(UpdateProductAmount {
//!         product_id: ProductId::new(10),
//!         amount: 3,
//!     })
//!     .await?;
//!
//! for item in &store.cart() {
//!     println!("{} x{}", item.title, item.amount);
//! }
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod notify;
pub mod persist;
pub mod store;

#[cfg(test)]
mod testing;

pub use cart::{Cart, Product};
pub use catalog::{CatalogProduct, CatalogService, LookupError, Stock};
pub use config::{CartConfig, Locale, PersistenceMode, CART_STORAGE_KEY};
pub use error::{CartError, CartOperation, LookupTarget};
pub use ids::ProductId;
pub use notify::{Notifier, NotifyingCart, TracingNotifier};
pub use persist::CartPersister;
pub use store::{CartStore, UpdateProductAmount};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, Product};
    pub use crate::catalog::{CatalogProduct, CatalogService, LookupError, Stock};
    pub use crate::config::{CartConfig, Locale, PersistenceMode};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::notify::{Notifier, NotifyingCart, TracingNotifier};
    pub use crate::store::{CartStore, UpdateProductAmount};
}
