//! In-process HTTP mocks for provider wire tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// An axum router served on an ephemeral localhost port.
pub(crate) struct MockServer {
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl MockServer {
    pub(crate) async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self { addr, _handle: handle }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Records every JSON request body and answers from a canned list.
#[derive(Clone, Default)]
pub(crate) struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorded {
    /// Answer every request with `response`.
    pub(crate) fn route_json(&self, response: Value) -> Router {
        self.route_sequence(vec![response])
    }

    /// Answer the n-th request with `responses[n]`; the last entry repeats.
    pub(crate) fn route_sequence(&self, responses: Vec<Value>) -> Router {
        assert!(!responses.is_empty(), "need at least one canned response");
        let bodies = self.bodies.clone();
        let responses = Arc::new(responses);
        Router::new().fallback(move |Json(body): Json<Value>| {
            let bodies = bodies.clone();
            let responses = responses.clone();
            async move {
                let mut seen = bodies.lock().await;
                seen.push(body);
                let idx = (seen.len() - 1).min(responses.len() - 1);
                Json(responses[idx].clone())
            }
        })
    }

    pub(crate) async fn last(&self) -> Value {
        self.bodies.lock().await.last().cloned().unwrap_or(Value::Null)
    }

    pub(crate) async fn all(&self) -> Vec<Value> {
        self.bodies.lock().await.clone()
    }
}
