//! HMAC-SHA512 request signing.
//!
//! # Responsibilities
//! - Inject the public key into a copy of the request fields
//! - Serialize the fields exactly once, in order
//! - Sign that exact string with the shared secret

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use sha2::Sha512;

use crate::commands::params::Params;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "HMAC";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// API key pair. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The public key sent as the `key` field.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A serialized body together with its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Form-encoded body, including `key`.
    pub body: String,
    /// Hex-encoded HMAC-SHA512 of `body`.
    pub hmac: String,
}

impl SignedRequest {
    /// `Content-Type` and `HMAC` headers for the request.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        // Lowercase hex is always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&self.hmac) {
            headers.insert(SIGNATURE_HEADER, value);
        }
        headers
    }
}

/// Signs request fields with a fixed key pair.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Add `key` to a copy of `params`, encode it and sign the encoding.
    ///
    /// A caller-supplied `key` field is replaced. The caller's params are not
    /// modified.
    pub fn sign(&self, params: &Params) -> SignedRequest {
        let mut fields = params.clone();
        fields.set_last("key", self.credentials.key());
        let body = fields.encode();
        let hmac = compute_hmac(self.credentials.secret().as_bytes(), body.as_bytes());
        SignedRequest { body, hmac }
    }
}

/// Compute HMAC-SHA512 over `body` with `secret`, hex-encoded.
pub fn compute_hmac(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex signature in constant time.
pub fn verify_hmac(secret: &[u8], body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
