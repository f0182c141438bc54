//! Remote API access.
//!
//! # Data Flow
//! ```text
//! Command + Params
//!     → dispatcher.rs (validate, inject cmd/version, sign, POST)
//!     → envelope.rs ({error, result} → Result<Value, ClientError>)
//! ```

pub mod dispatcher;
pub mod envelope;

pub use dispatcher::{Dispatcher, API_VERSION};
pub use envelope::Envelope;
