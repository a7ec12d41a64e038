//! Startup orchestration.
//!
//! Order: metrics exporter, listener, then the HTTP server. Any failure is
//! fatal.

use tokio::net::TcpListener;

use crate::config::schema::{ServiceConfig, DEFAULT_JWT_SECRET};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

pub async fn start(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("Using the default JWT secret. Set JWT_SECRET before deploying.");
    }

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
