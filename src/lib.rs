//! CoinPayments API client.
//!
//! Signs every request with HMAC-SHA512, wraps each of the API's commands in
//! a method, and can follow the status of transactions it creates by polling
//! in the background.
//!
//! # Architecture Overview
//!
//! ```text
//!  caller ──▶ client ──▶ commands ──▶ auth ──▶ api ──▶ POST api.php
//!               │       (validate)   (sign)  (dispatch, envelope)
//!               │                               ▲
//!               ▼                               │ get_tx_info_multi
//!            tracking ──────────────────────────┘
//!      (pending set, poller, events)
//!               │
//!               ▼
//!          subscribers (ClientEvent::AutoIpn / PollError)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use coinpayments::{CoinPayments, Params};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), coinpayments::ClientError> {
//! let client = CoinPayments::new("public-key", "private-secret")?;
//! let rates = client.rates(Params::new().with("short", 1)).await?;
//! println!("{rates}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod observability;
pub mod tracking;

pub use client::CoinPayments;
pub use commands::{Command, Params, WithdrawalEntry};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use tracking::ClientEvent;
