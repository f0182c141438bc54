//! Request authentication.
//!
//! # Data Flow
//! ```text
//! Params (validated, cmd + version injected)
//!     → signer.rs (clone, add key, form-encode, HMAC-SHA512)
//!     → SignedRequest { body, hmac } → dispatcher
//! ```
//!
//! # Security Constraints
//! - The secret is never logged or printed
//! - The signed string and the sent body are the same `String`

pub mod signer;

pub use signer::{Credentials, SignedRequest, Signer};
