//! Catalog client over HTTP.

use async_trait::async_trait;
use rocket_cart::{CatalogProduct, CatalogService, LookupError, ProductId, Stock};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::FetchError;

/// [`CatalogService`] backed by the storefront's REST API.
///
/// - `GET {base_url}/stock/{id}` → `{ "id": 1, "amount": 3 }`
/// - `GET {base_url}/products/{id}` → product record
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::ClientError(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx status, or a body that
    /// doesn't decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "catalog request");

        if !status.is_success() {
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::ParseError(format!("{url}: {e}")))
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        Ok(self.get_json(&format!("/stock/{id}")).await?)
    }

    async fn product(&self, id: ProductId) -> Result<CatalogProduct, LookupError> {
        Ok(self.get_json(&format!("/products/{id}")).await?)
    }
}
