use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use models::product::{Product, ProductInput};

use crate::errors::ServiceError;
use crate::storage::DocStore;

/// Persistence boundary for products. All calls are fire-once; there is no
/// retry policy.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> Result<Product, ServiceError>;
    async fn find_all(&self, search: Option<&str>) -> Result<Vec<Product>, ServiceError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ServiceError>;
    async fn update(&self, id: &str, input: ProductInput) -> Result<Option<Product>, ServiceError>;
    async fn delete(&self, id: &str) -> Result<Option<Product>, ServiceError>;
}

/// Document-store-backed repository implementation.
pub struct DocProductRepository {
    store: Arc<DocStore<Product>>,
}

impl DocProductRepository {
    pub fn new(store: Arc<DocStore<Product>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for DocProductRepository {
    async fn create(&self, product: Product) -> Result<Product, ServiceError> {
        self.store.insert(product.id.clone(), product.clone()).await?;
        Ok(product)
    }

    async fn find_all(&self, search: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let mut products = self.store.list().await;
        if let Some(name) = search {
            products.retain(|p| p.name == name);
        }
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ServiceError> {
        Ok(self.store.get(id).await)
    }

    async fn update(&self, id: &str, input: ProductInput) -> Result<Option<Product>, ServiceError> {
        let Some(mut existing) = self.store.get(id).await else {
            return Ok(None);
        };
        existing.name = input.name;
        existing.detail = input.detail;
        existing.price = input.price;
        existing.quantity = input.quantity;
        existing.updated_at = Utc::now();
        self.store.insert(existing.id.clone(), existing.clone()).await?;
        Ok(Some(existing))
    }

    async fn delete(&self, id: &str) -> Result<Option<Product>, ServiceError> {
        self.store.remove(id).await
    }
}
