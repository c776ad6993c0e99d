use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use pei_access::router::init_router;
use pei_access::state::init_app_state;
use pei_config::ServerConfig;
use pei_observability::{init_metrics, init_tracing, shutdown_tracer};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?.with_metrics(init_metrics());
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&server_config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr))?;

    info!(addr = %server_config.addr, "🚀 PEI access service listening");
    info!("📚 Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer().await;
    Ok(())
}
