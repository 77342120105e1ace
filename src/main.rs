use anyhow::anyhow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    webpluck_lib::run().await.map_err(|e| anyhow!(e))
}
