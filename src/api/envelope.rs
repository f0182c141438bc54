//! The `{error, result}` wrapper on every API response.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Value of `error` that marks a successful response.
pub const OK: &str = "ok";

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub error: String,
    #[serde(default)]
    pub result: Value,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.error == OK
    }

    /// `result` on success, otherwise an API error carrying `result`.
    pub fn into_result(self) -> ClientResult<Value> {
        if self.is_ok() {
            Ok(self.result)
        } else {
            Err(ClientError::Api {
                error: self.error,
                result: self.result,
            })
        }
    }
}
