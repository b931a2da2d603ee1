//! HTTP client for the RocketShoes catalog and stock API.
//!
//! [`HttpCatalog`] implements [`rocket_cart::CatalogService`] on top of
//! `reqwest`, so a [`rocket_cart::CartStore`] can check stock and fetch
//! products from the storefront backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_api::{ApiConfig, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&ApiConfig::new("http://localhost:3333"))?;
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! ```

mod client;
mod config;
mod error;

pub use client::HttpCatalog;
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use error::FetchError;
