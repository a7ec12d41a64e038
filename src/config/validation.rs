//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every problem is
//! reported, not just the first, and a config is only accepted when the list
//! is empty.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{RatePolicy, ServiceConfig};

/// Longest accepted token lifetime: ten years.
pub const MAX_EXPIRATION_HOURS: i64 = 10 * 365 * 24;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn check_policy(name: &str, policy: &RatePolicy, errors: &mut Vec<ValidationError>) {
    if policy.limit == 0 {
        errors.push(ValidationError::new(
            format!("rate_limit.{name}.limit"),
            "must be at least 1",
        ));
    }
    if policy.window_secs == 0 {
        errors.push(ValidationError::new(
            format!("rate_limit.{name}.window_secs"),
            "must be greater than 0",
        ));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must not be empty"));
    }
    if config.auth.expiration_hours <= 0 {
        errors.push(ValidationError::new(
            "auth.expiration_hours",
            "must be greater than 0",
        ));
    } else if config.auth.expiration_hours > MAX_EXPIRATION_HOURS {
        errors.push(ValidationError::new(
            "auth.expiration_hours",
            format!("must be at most {MAX_EXPIRATION_HOURS}"),
        ));
    }

    check_policy("register", &config.rate_limit.register, &mut errors);
    check_policy("login", &config.rate_limit.login, &mut errors);
    check_policy("general", &config.rate_limit.general, &mut errors);
    if config.rate_limit.cleanup_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.cleanup_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
