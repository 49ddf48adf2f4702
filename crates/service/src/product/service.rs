use std::sync::Arc;

use models::product::{Product, ProductInput};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::peer::PeerCatalog;
use crate::product::repository::ProductRepository;

/// Product business rules: input validation, `href` decoration, and the
/// optional peer-catalog import on create.
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    peer: Option<PeerCatalog>,
}

fn with_href(mut product: Product) -> Product {
    product.href = Some(format!("/products/{}", product.id));
    product
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo, peer: None }
    }

    /// Consult the given peer catalog before creating products locally.
    pub fn with_peer(mut self, peer: PeerCatalog) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Create a product. When a peer catalog is configured and already knows
    /// a product with this name, its record is imported instead; lookup
    /// failures fall back to local creation (fire-once, no retry).
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, ServiceError> {
        input.validate()?;
        if let Some(peer) = &self.peer {
            match peer.find_by_name(&input.name).await {
                Ok(Some(mut found)) => {
                    info!(product_id = %found.id, "importing product from peer catalog");
                    found.href = None;
                    let created = self.repo.create(found).await?;
                    return Ok(with_href(created));
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "peer catalog lookup failed; creating locally"),
            }
        }
        let created = self.repo.create(input.into_product()).await?;
        Ok(with_href(created))
    }

    pub async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let products = self.repo.find_all(search).await?;
        Ok(products.into_iter().map(with_href).collect())
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ServiceError> {
        match self.repo.find_by_id(id).await? {
            Some(product) => Ok(with_href(product)),
            None => Err(ServiceError::not_found("product")),
        }
    }

    pub async fn update_product(
        &self,
        id: &str,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        input.validate()?;
        match self.repo.update(id, input).await? {
            Some(product) => Ok(with_href(product)),
            None => Err(ServiceError::not_found("product")),
        }
    }

    pub async fn delete_product(&self, id: &str) -> Result<Product, ServiceError> {
        match self.repo.delete(id).await? {
            Some(product) => Ok(with_href(product)),
            None => Err(ServiceError::not_found("product")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::repository::DocProductRepository;
    use crate::storage::DocStore;

    async fn setup() -> ProductService {
        let path = std::env::temp_dir().join(format!("products_{}.json", uuid::Uuid::new_v4()));
        let store = DocStore::open(path).await.expect("store init");
        ProductService::new(Arc::new(DocProductRepository::new(store)))
    }

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: name.into(),
            detail: "test item".into(),
            price: 9.5,
            quantity: 3,
        }
    }

    #[tokio::test]
    async fn create_then_get_decorates_href() {
        let svc = setup().await;
        let created = svc.create_product(input("keyboard")).await.expect("create");
        assert_eq!(created.href.as_deref(), Some(format!("/products/{}", created.id).as_str()));

        let found = svc.get_product(&created.id).await.expect("get");
        assert_eq!(found.name, "keyboard");
        assert!(found.href.is_some());
    }

    #[tokio::test]
    async fn list_filters_by_exact_name() {
        let svc = setup().await;
        svc.create_product(input("keyboard")).await.expect("create");
        svc.create_product(input("mouse")).await.expect("create");

        let all = svc.list_products(None).await.expect("list");
        assert_eq!(all.len(), 2);

        let filtered = svc.list_products(Some("mouse")).await.expect("list");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "mouse");
    }

    #[tokio::test]
    async fn update_bumps_timestamp_and_keeps_id() {
        let svc = setup().await;
        let created = svc.create_product(input("keyboard")).await.expect("create");
        let updated = svc
            .update_product(&created.id, input("keyboard v2"))
            .await
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "keyboard v2");
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn missing_ids_surface_not_found() {
        let svc = setup().await;
        assert!(matches!(svc.get_product("nope").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.update_product("nope", input("x")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(svc.delete_product("nope").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_document() {
        let svc = setup().await;
        let created = svc.create_product(input("keyboard")).await.expect("create");
        let removed = svc.delete_product(&created.id).await.expect("delete");
        assert_eq!(removed.id, created.id);
        assert!(svc.get_product(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_hitting_the_store() {
        let svc = setup().await;
        let mut bad = input("keyboard");
        bad.price = -1.0;
        assert!(matches!(svc.create_product(bad).await, Err(ServiceError::Model(_))));
        assert!(svc.list_products(None).await.expect("list").is_empty());
    }
}
