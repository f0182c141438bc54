//! Signed request dispatch.
//!
//! # Responsibilities
//! - Validate caller fields before anything leaves the process
//! - Inject `cmd` and `version`, sign, POST once
//! - Unwrap the `{error, result}` envelope
//!
//! # Design Decisions
//! - No retries; a transport failure is returned as-is
//! - One call, one outcome

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::api::envelope::Envelope;
use crate::auth::{Credentials, Signer};
use crate::commands::{validate, Command, Params};
use crate::config::{ApiConfig, ValidationError};
use crate::error::{ClientError, ClientResult};
use crate::observability::metrics;

/// Protocol version sent with every request.
pub const API_VERSION: u32 = 1;

/// Sends signed commands to the API endpoint.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    endpoint: Url,
    signer: Signer,
}

impl Dispatcher {
    /// Build a dispatcher for `config.endpoint`.
    pub fn new(credentials: Credentials, config: &ApiConfig) -> ClientResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|_| {
            ClientError::Config(vec![ValidationError::InvalidEndpoint(config.endpoint.clone())])
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            builder = builder.default_headers([(USER_AGENT, agent)].into_iter().collect());
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint,
            signer: Signer::new(credentials),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Validate, sign and send one command.
    ///
    /// `params` holds only caller fields; `cmd`, `version` and `key` are
    /// added here and replace any caller values of the same name.
    pub async fn send(&self, command: Command, params: &Params) -> ClientResult<Value> {
        let cmd = command.as_str();

        if let Err(missing) = validate(params, command.required_fields()) {
            tracing::debug!(cmd, missing = ?missing.fields, "Rejected request with missing fields");
            metrics::record_rejected(cmd);
            return Err(missing.into());
        }

        let mut outbound = params.clone();
        outbound.set_last("cmd", cmd);
        outbound.set_last("version", API_VERSION);
        let signed = self.signer.sign(&outbound);

        let started = Instant::now();
        let result = self.post(signed.headers(), signed.body).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(ClientError::Api { .. }) => "api_error",
            Err(ClientError::MalformedResponse(_)) => "malformed",
            Err(_) => "transport_error",
        };
        metrics::record_request(cmd, outcome, started.elapsed());

        match &result {
            Ok(_) => tracing::debug!(cmd, "API call succeeded"),
            Err(e) => tracing::warn!(cmd, error = %e, "API call failed"),
        }
        result
    }

    async fn post(&self, headers: reqwest::header::HeaderMap, body: String) -> ClientResult<Value> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let text = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| ClientError::MalformedResponse(format!("{e}: {}", truncate(&text, 200))))?;
        envelope.into_result()
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
