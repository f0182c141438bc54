//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher, poller, CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape (optional, CLI only)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the binary's job
//! - Credentials never appear in fields

pub mod logging;
pub mod metrics;
