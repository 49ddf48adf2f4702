#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run_product_service().await
}
