pub mod products;
pub mod users;

use std::sync::Arc;

use common::types::Health;
use framework::{AppRouter, AppServer};
use service::product::ProductService;
use service::user::UserService;

fn health_router() -> AppRouter {
    AppRouter::new().get("/health", |_ctx| async move {
        Ok(Some(serde_json::to_value(Health { status: "ok" })?))
    })
}

/// Product catalog service: health + product CRUD.
pub fn build_product_app(products: Arc<ProductService>) -> AppServer {
    let mut server = AppServer::new();
    server.mount(&health_router()).mount(&products::router(products));
    server
}

/// Customer service: health + product CRUD (with peer fallback wired into the
/// service) + user lookup.
pub fn build_customer_app(products: Arc<ProductService>, users: Arc<UserService>) -> AppServer {
    let mut server = AppServer::new();
    server
        .mount(&health_router())
        .mount(&products::router(products))
        .mount(&users::router(users));
    server
}
