#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run_customer_service().await
}
