use anyhow::{Context, Result};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use helpdesk::{api, Services};

/// Binds `address` and serves the HTTP API until a shutdown signal.
pub fn run(services: Services, address: &str, shutdown_timeout: Duration) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        info!(address = %listener.local_addr()?, "Listening");
        api::serve(listener, services, shutdown_timeout).await
    })
}
