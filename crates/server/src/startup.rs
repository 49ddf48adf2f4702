use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use service::peer::PeerCatalog;
use service::product::{DocProductRepository, ProductService};
use service::storage::DocStore;
use service::user::{DocUserRepository, UserService};
use tracing::info;

use crate::routes;

fn init_logging() {
    init_logging_default();
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn product_service(cfg: &AppConfig) -> anyhow::Result<Arc<ProductService>> {
    let store = DocStore::open(Path::new(&cfg.store.data_dir).join("products.json")).await?;
    let repo = Arc::new(DocProductRepository::new(store));
    let mut service = ProductService::new(repo);
    if let Some(url) = &cfg.peer.product_url {
        info!(peer = %url, "peer product catalog configured");
        service = service.with_peer(PeerCatalog::new(url));
    }
    Ok(Arc::new(service))
}

async fn user_service(cfg: &AppConfig) -> anyhow::Result<Arc<UserService>> {
    let store = DocStore::open(Path::new(&cfg.store.data_dir).join("users.json")).await?;
    Ok(Arc::new(UserService::new(Arc::new(DocUserRepository::new(store)))))
}

/// Public entry for the product catalog service.
pub async fn run_product_service() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_and_validate()?;
    let products = product_service(&cfg).await?;

    let mut app = routes::build_product_app(products);
    app.register()?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting product service");
    app.listen(addr).await?;
    Ok(())
}

/// Public entry for the customer service: products (with optional peer
/// catalog fallback) plus user lookup.
pub async fn run_customer_service() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_and_validate()?;
    let products = product_service(&cfg).await?;
    let users = user_service(&cfg).await?;

    let mut app = routes::build_customer_app(products, users);
    app.register()?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting customer service");
    app.listen(addr).await?;
    Ok(())
}
