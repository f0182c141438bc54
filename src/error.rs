//! Error types surfaced by the client.
//!
//! Every caller-facing outcome is a `Result<_, ClientError>`. The only error
//! raised outside a request is the construction failure for missing or
//! invalid configuration.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors returned by [`crate::CoinPayments`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Public key and/or secret were empty at construction.
    #[error("Missing public key and/or secret")]
    MissingCredentials,

    /// Configuration failed semantic validation.
    #[error("Invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    /// The command name is not part of the API catalog.
    #[error("No such method {0}")]
    UnknownCommand(String),

    /// Required fields were absent from the caller's parameters.
    #[error(transparent)]
    MissingFields(#[from] MissingFields),

    /// The HTTP exchange itself failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-"ok" envelope. `result` is the envelope's payload.
    #[error("API error: {error} ({})", display_payload(.result))]
    Api {
        error: String,
        result: serde_json::Value,
    },

    /// The response body was not a JSON `{error, result}` envelope.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// Tracking was requested outside a Tokio runtime, so no poller could start.
    #[error("Transaction tracking requires a Tokio runtime")]
    NoRuntime,
}

impl ClientError {
    /// The envelope payload of an API error.
    pub fn api_result(&self) -> Option<&serde_json::Value> {
        match self {
            ClientError::Api { result, .. } => Some(result),
            _ => None,
        }
    }

    /// True for failures detected locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::MissingCredentials
                | ClientError::Config(_)
                | ClientError::UnknownCommand(_)
                | ClientError::MissingFields(_)
                | ClientError::NoRuntime
        )
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every required field or alternative group missing from a request.
///
/// Alternative groups are rendered with `|` between their members,
/// e.g. `merchant|pbntag`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing options: {}", .fields.join(", "))]
pub struct MissingFields {
    pub fields: Vec<String>,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_payload(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
