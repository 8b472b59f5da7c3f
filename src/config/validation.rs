//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities > 0)
//! - Check that addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("driver.program must not be empty")]
    EmptyProgram,

    #[error("driver.restart_timeout_ms must be greater than zero")]
    ZeroRestartTimeout,

    #[error("timeouts.request_secs ({request_secs}s) must exceed the driver restart timeout ({restart_ms}ms)")]
    RequestTimeoutTooShort { request_secs: u64, restart_ms: u64 },

    #[error("logs.capacity must be greater than zero")]
    ZeroLogCapacity,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.driver.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram);
    }

    let restart_ms = config.driver.restart_timeout_ms;
    if restart_ms == 0 {
        errors.push(ValidationError::ZeroRestartTimeout);
    }

    // A restart must fit inside one request.
    let request_secs = config.timeouts.request_secs;
    if request_secs.saturating_mul(1_000) <= restart_ms {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs,
            restart_ms,
        });
    }

    if config.logs.capacity == 0 {
        errors.push(ValidationError::ZeroLogCapacity);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
