//! Background status polling for tracked transactions.
//!
//! # States
//! - Idle: no task, no timer
//! - Running: one task ticking at the configured interval
//!
//! # State Transitions
//! ```text
//! Idle → Running: first id tracked (first cycle runs immediately)
//! Running → Idle: pending set empty at the start or end of a cycle,
//!                 or emptied by untrack()
//! ```
//!
//! Cycles run one at a time inside the task and late ticks are skipped, so a
//! slow batch never overlaps the next one. Each running task carries a
//! generation number; a task that is no longer current never touches state.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::api::Dispatcher;
use crate::commands::{Command, Params};
use crate::error::{ClientError, ClientResult};
use crate::observability::metrics;
use crate::tracking::events::{ClientEvent, EventBus};
use crate::tracking::pending::{status_code, PendingTransactions};

enum PollState {
    Idle,
    Running { generation: u64, handle: JoinHandle<()> },
}

struct TrackerState {
    pending: PendingTransactions,
    poll: PollState,
    next_generation: u64,
}

impl TrackerState {
    fn is_current(&self, generation: u64) -> bool {
        matches!(self.poll, PollState::Running { generation: g, .. } if g == generation)
    }

    /// Cancel the running task, if any.
    fn cancel(&mut self) {
        if let PollState::Running { handle, .. } = mem::replace(&mut self.poll, PollState::Idle) {
            handle.abort();
            tracing::info!("Transaction polling stopped");
        }
    }

    /// Called by the running task itself when it exits.
    fn finish(&mut self) {
        self.poll = PollState::Idle;
        tracing::info!("Transaction polling stopped");
    }
}

struct Shared {
    state: Mutex<TrackerState>,
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
    interval: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().expect("tracker mutex poisoned")
    }
}

/// Tracks pending transactions and polls their status until terminal.
pub struct Poller {
    shared: Arc<Shared>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

impl Poller {
    pub fn new(dispatcher: Arc<Dispatcher>, events: EventBus, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TrackerState {
                    pending: PendingTransactions::new(),
                    poll: PollState::Idle,
                    next_generation: 0,
                }),
                dispatcher,
                events,
                interval,
            }),
        }
    }

    /// Start tracking `txn_id`, starting the poll loop if idle.
    ///
    /// Returns false if the id was already tracked. Fails with
    /// [`ClientError::NoRuntime`] outside a Tokio runtime, leaving the
    /// pending set untouched.
    pub fn track(&self, txn_id: impl Into<String>) -> ClientResult<bool> {
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        let txn_id = txn_id.into();
        let mut state = self.shared.lock();
        let added = state.pending.track(txn_id.clone());
        metrics::record_tracked(state.pending.len());
        if added {
            tracing::info!(txn_id = %txn_id, pending = state.pending.len(), "Tracking transaction");
        }

        if matches!(state.poll, PollState::Idle) {
            let generation = state.next_generation;
            state.next_generation += 1;
            let handle = runtime.spawn(run(Arc::clone(&self.shared), generation));
            state.poll = PollState::Running { generation, handle };
            tracing::info!(
                interval_secs = self.shared.interval.as_secs(),
                "Transaction polling started"
            );
        }
        Ok(added)
    }

    /// Stop tracking `txn_id`. Polling stops when nothing is left.
    pub fn untrack(&self, txn_id: &str) -> bool {
        let mut state = self.shared.lock();
        let removed = state.pending.untrack(txn_id);
        metrics::record_tracked(state.pending.len());
        if state.pending.is_empty() {
            state.cancel();
        }
        removed
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.shared.lock().poll, PollState::Running { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().pending.is_empty()
    }

    /// Snapshot of tracked ids in tracking order.
    pub fn pending(&self) -> Vec<String> {
        self.shared.lock().pending.ids()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shared.lock().cancel();
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Poller")
            .field("pending", &state.pending.len())
            .field("running", &matches!(state.poll, PollState::Running { .. }))
            .field("interval", &self.shared.interval)
            .finish()
    }
}

async fn run(shared: Arc<Shared>, generation: u64) {
    let mut ticker = time::interval(shared.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if poll_cycle(&shared, generation).await == Flow::Stop {
            break;
        }
    }
}

async fn poll_cycle(shared: &Shared, generation: u64) -> Flow {
    let batch = {
        let mut state = shared.lock();
        if !state.is_current(generation) {
            return Flow::Stop;
        }
        if state.pending.is_empty() {
            state.finish();
            return Flow::Stop;
        }
        state.pending.batch_query()
    };

    let params = Params::new().with("txid", &batch);
    let result = match shared.dispatcher.send(Command::GetTxInfoMulti, &params).await {
        Ok(Value::Object(result)) => result,
        Ok(other) => {
            report_failure(shared, format!("unexpected status payload: {other}"));
            return Flow::Continue;
        }
        Err(e) => {
            report_failure(shared, e.to_string());
            return Flow::Continue;
        }
    };

    metrics::record_poll_cycle("ok");
    shared.events.emit(ClientEvent::AutoIpn(result.clone()));

    let mut state = shared.lock();
    if !state.is_current(generation) {
        return Flow::Stop;
    }
    for txn_id in state.pending.remove_terminal(&result) {
        let status = result.get(&txn_id).and_then(status_code);
        tracing::info!(txn_id = %txn_id, status = ?status, "Transaction reached terminal status");
    }
    metrics::record_tracked(state.pending.len());

    if state.pending.is_empty() {
        state.finish();
        Flow::Stop
    } else {
        Flow::Continue
    }
}

fn report_failure(shared: &Shared, message: String) {
    tracing::warn!(error = %message, "Polling error, retrying next interval");
    metrics::record_poll_cycle("error");
    shared.events.emit(ClientEvent::PollError(message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::ApiConfig;

    fn poller() -> Poller {
        let config = ApiConfig {
            endpoint: "http://127.0.0.1:9/api.php".into(),
            ..ApiConfig::default()
        };
        let dispatcher = Dispatcher::new(Credentials::new("k", "s"), &config).unwrap();
        Poller::new(Arc::new(dispatcher), EventBus::new(8), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_track_starts_and_untrack_stops() {
        let poller = poller();
        assert!(!poller.is_polling());

        assert!(poller.track("A").unwrap());
        assert!(!poller.track("A").unwrap());
        assert!(poller.is_polling());
        assert_eq!(poller.pending(), vec!["A"]);

        assert!(poller.untrack("A"));
        assert!(!poller.is_polling());
        assert!(poller.is_empty());
    }

    #[tokio::test]
    async fn test_untrack_keeps_polling_while_others_remain() {
        let poller = poller();
        poller.track("A").unwrap();
        poller.track("B").unwrap();
        poller.untrack("A");
        assert!(poller.is_polling());
        assert!(!poller.untrack("A"));
        assert_eq!(poller.pending(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_poll_error() {
        let poller = poller();
        let mut events = poller.shared.events.subscribe();
        poller.track("A").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, ClientEvent::PollError(_)));
        assert!(poller.is_polling());
        assert_eq!(poller.pending(), vec!["A"]);
    }

    #[test]
    fn test_track_outside_runtime_leaves_state_untouched() {
        let poller = poller();
        assert!(matches!(poller.track("A"), Err(ClientError::NoRuntime)));
        assert!(!poller.is_polling());
        assert!(poller.is_empty());
        assert!(!poller.untrack("A"));
    }
}
