use models::product::Product;
use tracing::debug;

use crate::errors::ServiceError;

/// Client for a peer product catalog, consulted before creating products
/// locally. A peer 404 means "no match"; every other non-success status is an
/// upstream error the caller may choose to swallow.
#[derive(Clone)]
pub struct PeerCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl PeerCatalog {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Look a product up by exact name via `GET /products?search={name}`.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        let url = format!("{}/products", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("search", name)])
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(name, "peer catalog has no products");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(ServiceError::Upstream(format!("peer returned {}", resp.status())));
        }
        let products = resp
            .json::<Vec<Product>>()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        Ok(products.into_iter().find(|p| p.name == name))
    }
}
