//! Transaction tracking subsystem.
//!
//! # Data Flow
//! ```text
//! create_transaction succeeds (auto_track on)
//!     → poller.rs track(txn_id) → pending.rs
//!     → Idle → Running: spawn poll task
//!
//! every interval:
//!     → get_tx_info_multi(txid = "A|B|C")
//!     → events.rs AutoIpn(result) to subscribers
//!     → pending.rs drop terminal ids
//!     → pending empty → Running → Idle
//! ```

pub mod events;
pub mod pending;
pub mod poller;

pub use events::{ClientEvent, EventBus};
pub use pending::PendingTransactions;
pub use poller::Poller;
