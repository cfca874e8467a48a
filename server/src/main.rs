use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use server::config::{ProviderConfig, ServerConfig};
use server::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before the subscriber, so RUST_LOG may come from .env
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting student chat server...");

    let config = ServerConfig::from_env();
    let providers = ProviderConfig::from_env();
    info!(
        "Server configuration loaded: port={}, request_timeout={}s, llm_timeout={}s, frontend_dir={}",
        config.port,
        config.request_timeout_secs,
        config.llm_timeout_secs,
        config.frontend_dir.display()
    );

    let state = AppState::from_config(config.clone(), &providers);
    let app = create_app(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
