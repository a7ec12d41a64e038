//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a configured level is set.
pub const DEFAULT_FILTER: &str = "user_service=debug,tower_http=debug";

/// Build the filter for a configured level such as `"info"`.
pub fn filter_for(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if log_level.is_empty() {
            DEFAULT_FILTER.into()
        } else {
            format!("user_service={log_level},tower_http={log_level}").into()
        }
    })
}

/// Install the global subscriber.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(filter_for(log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
