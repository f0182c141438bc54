//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject missing credentials and unusable tracking settings
//! - Check the endpoint is a URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("credentials.key must not be empty")]
    EmptyKey,

    #[error("credentials.secret must not be empty")]
    EmptySecret,

    #[error("api.endpoint '{0}' is not a valid URL")]
    InvalidEndpoint(String),

    #[error("tracking.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,

    #[error("tracking.event_capacity must be greater than zero")]
    ZeroEventCapacity,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.credentials.key.is_empty() {
        errors.push(ValidationError::EmptyKey);
    }
    if config.credentials.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if Url::parse(&config.api.endpoint).is_err() {
        errors.push(ValidationError::InvalidEndpoint(config.api.endpoint.clone()));
    }
    if config.tracking.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.tracking.event_capacity == 0 {
        errors.push(ValidationError::ZeroEventCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
