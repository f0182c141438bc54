//! Shared utilities for integration tests: an in-process mock of the API.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use coinpayments::{ClientConfig, CoinPayments, Params};

pub const KEY: &str = "mockKey";
pub const SECRET: &str = "mockSecret";

/// One request as the mock API saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub content_type: Option<String>,
    pub hmac: Option<String>,
    pub body: String,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn params(&self) -> Params {
        Params::decode(&self.body)
    }

    pub fn cmd(&self) -> String {
        self.params().get("cmd").unwrap_or_default().to_string()
    }
}

type Reply = Pin<Box<dyn Future<Output = String> + Send>>;
type Responder = Arc<dyn Fn(Params) -> Reply + Send + Sync>;

struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    responder: Responder,
}

/// A running mock API.
pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockApi {
    pub fn endpoint(&self) -> String {
        format!("http://{}/api.php", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Client pointed at this mock.
    pub fn client(&self, auto_track: bool, poll_interval_secs: u64) -> CoinPayments {
        let mut config = ClientConfig::default();
        config.credentials.key = KEY.into();
        config.credentials.secret = SECRET.into();
        config.api.endpoint = self.endpoint();
        config.tracking.auto_track = auto_track;
        config.tracking.poll_interval_secs = poll_interval_secs;
        CoinPayments::from_config(config).unwrap()
    }
}

/// Start a mock API whose reply body is computed from the decoded request fields.
pub async fn start_mock_api<F>(responder: F) -> MockApi
where
    F: Fn(&Params) -> String + Send + Sync + 'static,
{
    serve(Arc::new(move |params: Params| -> Reply {
        let reply = responder(&params);
        Box::pin(async move { reply })
    }))
    .await
}

/// Like [`start_mock_api`], but the reply is produced asynchronously so a
/// handler can stall without blocking the server.
#[allow(dead_code)]
pub async fn start_async_mock_api<F, Fut>(responder: F) -> MockApi
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = String> + Send + 'static,
{
    serve(Arc::new(move |params: Params| -> Reply { Box::pin(responder(params)) })).await
}

async fn serve(responder: Responder) -> MockApi {
    let state = Arc::new(MockState {
        requests: Mutex::new(Vec::new()),
        responder,
    });

    let app = Router::new()
        .route("/api.php", post(handle))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockApi { addr, state }
}

async fn handle(State(state): State<Arc<MockState>>, headers: HeaderMap, body: String) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        content_type: header("content-type"),
        hmac: header("hmac"),
        body: body.clone(),
    };
    state.requests.lock().unwrap().push(recorded);
    (state.responder)(Params::decode(&body)).await
}

/// `{"error": "ok", "result": result}`
pub fn ok(result: Value) -> String {
    json!({ "error": "ok", "result": result }).to_string()
}

/// `{"error": message, "result": []}`
#[allow(dead_code)]
pub fn api_error(message: &str) -> String {
    json!({ "error": message, "result": [] }).to_string()
}

/// Poll `check` every 50ms until it holds or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
