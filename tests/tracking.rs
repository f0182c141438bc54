//! Transaction tracking and status polling against a mock API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::sync::broadcast;

use coinpayments::{ClientEvent, Params};

mod common;
use common::{ok, start_async_mock_api, start_mock_api, wait_until};

const WAIT: Duration = Duration::from_secs(10);

/// Reply to `create_transaction` with `txn_id` and to status polls with
/// whatever `statuses` maps each requested id to.
fn responder<F>(txn_id: &'static str, statuses: F) -> impl Fn(&Params) -> String + Send + Sync
where
    F: Fn(&str, usize) -> i64 + Send + Sync + 'static,
{
    let cycles = AtomicUsize::new(0);
    move |params: &Params| match params.get("cmd") {
        Some("create_transaction") => ok(json!({
            "amount": "1.00000000",
            "txn_id": txn_id,
            "address": "addr",
            "timeout": 9000,
        })),
        Some("get_tx_info_multi") => {
            let cycle = cycles.fetch_add(1, Ordering::SeqCst);
            let mut result = Map::new();
            for id in params.get("txid").unwrap_or_default().split('|') {
                result.insert(
                    id.to_string(),
                    json!({"error": "ok", "status": statuses(id, cycle), "status_text": "..."}),
                );
            }
            ok(Value::Object(result))
        }
        _ => ok(json!({})),
    }
}

fn transaction() -> Params {
    Params::new()
        .with("amount", 1)
        .with("currency1", "USD")
        .with("currency2", "BTC")
}

async fn next_event(events: &mut broadcast::Receiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_created_transaction_is_tracked_and_reported() {
    let api = start_mock_api(responder("CPX1", |_, _| 0)).await;
    let client = api.client(true, 1);
    let mut events = client.subscribe();

    let result = client.create_transaction(transaction()).await.unwrap();
    assert_eq!(result["txn_id"], "CPX1");
    assert_eq!(client.pending_transactions(), vec!["CPX1"]);
    assert!(client.is_polling());

    match next_event(&mut events).await {
        ClientEvent::AutoIpn(statuses) => {
            assert_eq!(statuses["CPX1"]["status"], 0);
        }
        other => panic!("expected status event, got {other:?}"),
    }

    let polls = api
        .requests()
        .iter()
        .filter(|r| r.cmd() == "get_tx_info_multi")
        .count();
    assert!(polls >= 1);
    assert!(client.is_polling());
}

#[tokio::test]
async fn test_auto_track_off_tracks_nothing() {
    let api = start_mock_api(responder("CPX1", |_, _| 0)).await;
    let client = api.client(false, 1);

    client.create_transaction(transaction()).await.unwrap();
    assert!(client.pending_transactions().is_empty());
    assert!(!client.is_polling());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn test_terminal_statuses_stop_polling() {
    let api = start_mock_api(responder("unused", |id, _| match id {
        "DONE" => 100,
        "PAID" => 1,
        _ => -1,
    }))
    .await;
    let client = api.client(false, 1);
    let mut events = client.subscribe();

    client.track("DONE").unwrap();
    client.track("PAID").unwrap();
    client.track("EXPIRED").unwrap();

    // The event for the final batch is emitted before the ids are removed.
    match next_event(&mut events).await {
        ClientEvent::AutoIpn(statuses) => assert_eq!(statuses.len(), 3),
        other => panic!("expected status event, got {other:?}"),
    }
    assert!(wait_until(WAIT, || !client.is_polling()).await);
    assert!(client.pending_transactions().is_empty());

    let count = api.request_count();
    assert_eq!(count, 1);
    assert_eq!(api.requests()[0].params().get("txid"), Some("DONE|PAID|EXPIRED"));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(api.request_count(), count);
}

#[tokio::test]
async fn test_ids_leave_the_batch_as_they_finish() {
    // A completes on the second cycle, B stays pending until the third.
    let api = start_mock_api(responder("unused", |id, cycle| match (id, cycle) {
        ("A", c) if c >= 1 => 100,
        ("B", c) if c >= 2 => 1,
        _ => 0,
    }))
    .await;
    let client = api.client(false, 1);

    client.track("A").unwrap();
    client.track("B").unwrap();

    assert!(wait_until(WAIT, || !client.is_polling()).await);
    let batches: Vec<String> = api
        .requests()
        .iter()
        .filter_map(|r| r.params().get("txid").map(str::to_string))
        .collect();
    assert_eq!(batches, vec!["A|B", "A|B", "B"]);
}

#[tokio::test]
async fn test_poll_errors_are_reported_and_polling_continues() {
    let failures = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&failures);
    let api = start_mock_api(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            json!({"error": "Rate limit exceeded", "result": []}).to_string()
        } else {
            ok(json!({"X": {"error": "ok", "status": 100}}))
        }
    })
    .await;
    let client = api.client(false, 1);
    let mut events = client.subscribe();

    client.track("X").unwrap();

    match next_event(&mut events).await {
        ClientEvent::PollError(message) => assert!(message.contains("Rate limit exceeded")),
        other => panic!("expected poll error, got {other:?}"),
    }
    assert!(client.is_polling());
    assert_eq!(client.pending_transactions(), vec!["X"]);

    assert!(matches!(next_event(&mut events).await, ClientEvent::AutoIpn(_)));
    assert!(wait_until(WAIT, || !client.is_polling()).await);
    assert_eq!(failures.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_untrack_stops_polling_without_further_requests() {
    let api = start_mock_api(responder("unused", |_, _| 0)).await;
    let client = api.client(false, 1);

    client.track("A").unwrap();
    assert!(wait_until(WAIT, || api.request_count() >= 1).await);
    assert!(client.untrack("A"));
    assert!(!client.is_polling());

    let count = api.request_count();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(api.request_count(), count);
}

#[tokio::test]
async fn test_tracking_again_after_idle_restarts_polling() {
    let api = start_mock_api(responder("unused", |_, _| 100)).await;
    let client = api.client(false, 1);

    client.track("A").unwrap();
    assert!(wait_until(WAIT, || !client.is_polling()).await);

    client.track("B").unwrap();
    assert!(client.is_polling());
    assert!(wait_until(WAIT, || !client.is_polling()).await);
    assert_eq!(api.request_count(), 2);
}

#[tokio::test]
async fn test_slow_batches_never_overlap() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (current, highest) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let api = start_async_mock_api(move |_| {
        let current = Arc::clone(&current);
        let highest = Arc::clone(&highest);
        async move {
            let now = current.fetch_add(1, Ordering::SeqCst) + 1;
            highest.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2500)).await;
            current.fetch_sub(1, Ordering::SeqCst);
            ok(json!({"SLOW": {"error": "ok", "status": 0}}))
        }
    })
    .await;
    let client = api.client(false, 1);

    client.track("SLOW").unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(peak.load(Ordering::SeqCst), 1);
    let polls = api.request_count();
    assert!((2..=3).contains(&polls), "{polls} polls in 6s");
    assert!(client.is_polling());
}

#[tokio::test]
async fn test_dropping_the_client_stops_polling() {
    let api = start_mock_api(responder("unused", |_, _| 0)).await;
    let client = api.client(false, 1);

    client.track("A").unwrap();
    assert!(wait_until(WAIT, || api.request_count() >= 1).await);
    drop(client);

    let count = api.request_count();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(api.request_count(), count);
}
