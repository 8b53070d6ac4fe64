use anyhow::Context;
use tracing::{error, info};

use inventory_tracker::app_system::{setup_tracing, AppConfig, InventorySystem};
use inventory_tracker::change_bus::ChangeBus;
use inventory_tracker::gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    setup_tracing(config.log_format);

    info!(listen_addr = %config.listen_addr, shards = config.store_shards, "Starting inventory tracker");
    let system = InventorySystem::start(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %listener.local_addr()?, "Gateway listening");

    let app = gateway::router(system.service.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(system.service.bus().clone()))
        .await
        .context("gateway failed")?;

    system.shutdown().await?;
    info!("Inventory tracker stopped");
    Ok(())
}

/// Resolves on Ctrl-C. Closing the bus ends open event streams so the server can drain.
async fn shutdown_signal(bus: ChangeBus) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    bus.close();
}
