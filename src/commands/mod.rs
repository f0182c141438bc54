//! Command catalog and parameter handling.
//!
//! # Data Flow
//! ```text
//! caller fields (Params)
//!     → catalog.rs (command name → required fields)
//!     → validation.rs (presence checks, alternative groups)
//!     → dispatcher injects cmd + version, signer injects key
//! ```
//!
//! `mass_withdrawal.rs` owns the indexed `wd[wd{n}][...]` layout used by
//! `create_mass_withdrawal`.

pub mod catalog;
pub mod mass_withdrawal;
pub mod params;
pub mod validation;

pub use catalog::{required_fields, Command, RequiredField};
pub use mass_withdrawal::WithdrawalEntry;
pub use params::Params;
pub use validation::validate;
