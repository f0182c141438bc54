//! Per-client observer channel.

use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Notifications emitted by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Result of a successful status poll: transaction id → status info.
    AutoIpn(Map<String, Value>),
    /// A status poll failed; polling continues on the next tick.
    PollError(String),
}

/// Broadcast channel owned by one client.
///
/// Subscribers unsubscribe by dropping their receiver.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Deliver to current subscribers. Having none is not an error.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
