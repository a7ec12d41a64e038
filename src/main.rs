//! User management REST service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ Axum router ──┬─▶ /health
//!                            ├─▶ /api/auth/register ─▶ [register limiter] ─▶ handler ─┐
//!                            ├─▶ /api/auth/login    ─▶ [login limiter]    ─▶ handler ─┤
//!                            └─▶ /api/users/*       ─▶ [auth guard] ─▶ [general limiter]
//!                                                                         ─▶ handler ─┤
//!                                                                                     ▼
//!                                                                              UserStore
//! ```
//!
//! Each limiter is an independent instance with its own cleanup task.

use std::path::PathBuf;
use clap::Parser;

use user_service::config::load_config;
use user_service::lifecycle::startup;
use user_service::observability::logging;

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User management REST service", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("user-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
