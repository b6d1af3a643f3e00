use std::sync::Arc;

use pillory_api::config::AppConfig;
use pillory_api::{router, AppState, SERVICE_NAME};
use pillory_shared::clients::db::create_pool;
use pillory_shared::clients::minotar::MinotarClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    pillory_shared::middleware::init_tracing(SERVICE_NAME);

    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    let minotar = MinotarClient::new(config.minotar())?;
    let metrics_handle = pillory_shared::middleware::init_metrics()?;

    let state = Arc::new(AppState {
        db,
        config,
        minotar,
        metrics_handle,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "pillory-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
