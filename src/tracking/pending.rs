//! The set of transactions awaiting a terminal status.

use indexmap::IndexSet;
use serde_json::Value;

/// Status codes after which a transaction no longer changes.
pub const TERMINAL_SUCCESS: [i64; 2] = [1, 100];

/// Insertion-ordered, duplicate-free transaction ids.
#[derive(Debug, Clone, Default)]
pub struct PendingTransactions {
    ids: IndexSet<String>,
}

impl PendingTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id. Returns false if it was already tracked.
    pub fn track(&mut self, txn_id: impl Into<String>) -> bool {
        self.ids.insert(txn_id.into())
    }

    /// Remove an id. Returns false if it was not tracked.
    pub fn untrack(&mut self, txn_id: &str) -> bool {
        self.ids.shift_remove(txn_id)
    }

    pub fn contains(&self, txn_id: &str) -> bool {
        self.ids.contains(txn_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Ids joined for a single `get_tx_info_multi` call.
    pub fn batch_query(&self) -> String {
        self.ids.iter().map(String::as_str).collect::<Vec<_>>().join("|")
    }

    /// Drop every id whose entry in a poll result is terminal.
    ///
    /// Removal is keyed by the result's transaction ids. Returns the removed ids.
    pub fn remove_terminal(&mut self, result: &serde_json::Map<String, Value>) -> Vec<String> {
        let finished: Vec<String> = result
            .iter()
            .filter(|(_, info)| is_terminal(info))
            .map(|(txn_id, _)| txn_id.clone())
            .filter(|txn_id| self.ids.contains(txn_id))
            .collect();
        for txn_id in &finished {
            self.ids.shift_remove(txn_id);
        }
        finished
    }
}

/// Status code from a per-transaction status entry.
///
/// Accepts integers, whole floats (`100.0`) and numeric strings.
pub fn status_code(info: &Value) -> Option<i64> {
    match info.get("status")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(whole))
        }
        _ => None,
    }
}

fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Negative (failed), success sentinels, or a per-entry error.
pub fn is_terminal(info: &Value) -> bool {
    let entry_failed = info
        .get("error")
        .and_then(Value::as_str)
        .is_some_and(|e| e != crate::api::envelope::OK);
    if entry_failed {
        return true;
    }
    status_code(info).is_some_and(|code| code < 0 || TERMINAL_SUCCESS.contains(&code))
}
