//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)            COINPAYMENTS_KEY / COINPAYMENTS_SECRET
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → CoinPayments::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the client is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{ApiConfig, ClientConfig, CredentialsConfig, LogFormat, ObservabilityConfig, TrackingConfig};
pub use validation::ValidationError;
