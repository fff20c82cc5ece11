//! In-process JSON-RPC node for integration tests.
//!
//! Each method has a script of replies served in order; the last reply
//! repeats once the script runs out. Every request body is recorded.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

static TRACING_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("blockprobe_core=debug")
                }),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Clone, Debug)]
pub enum Reply {
    Result(Value),
    Error { code: i64, message: String },
    Status(StatusCode, String),
    /// A JSON body sent as-is apart from the request id, which is copied in.
    Envelope(Value),
    /// Never answer.
    Hang,
}

impl Reply {
    pub fn error(code: i64, message: &str) -> Self {
        Self::Error {
            code,
            message: message.to_string(),
        }
    }
}

#[derive(Default)]
struct NodeState {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Value>>,
}

impl NodeState {
    fn next_reply(&self, method: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().expect("mock scripts poisoned");
        let script = scripts.get_mut(method)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

pub struct MockNode {
    url: String,
    state: Arc<NodeState>,
    handle: JoinHandle<()>,
}

impl MockNode {
    pub async fn start() -> Self {
        let state = Arc::new(NodeState::default());
        let app = Router::new()
            .route("/", post(handle_call))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock node must bind");
        let addr = listener.local_addr().expect("mock node must have an address");
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                eprintln!("mock node stopped: {err}");
            }
        });

        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn script(&self, method: &str, replies: impl IntoIterator<Item = Reply>) -> &Self {
        self.state
            .scripts
            .lock()
            .expect("mock scripts poisoned")
            .insert(method.to_string(), replies.into_iter().collect());
        self
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .expect("mock requests poisoned")
            .clone()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|req| req.get("method").and_then(Value::as_str) == Some(method))
            .count()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_call(State(state): State<Arc<NodeState>>, Json(call): Json<Value>) -> Response {
    let id = call.get("id").cloned().unwrap_or(Value::Null);
    let method = call
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state
        .requests
        .lock()
        .expect("mock requests poisoned")
        .push(call);

    match state.next_reply(&method) {
        Some(Reply::Result(result)) => {
            Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response()
        }
        Some(Reply::Error { code, message }) => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message},
        }))
        .into_response(),
        Some(Reply::Status(status, body)) => (status, body).into_response(),
        Some(Reply::Envelope(mut body)) => {
            body["id"] = id;
            ([(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
        }
        Some(Reply::Hang) => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
        None => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": format!("unknown method {method}")},
        }))
        .into_response(),
    }
}

// ==============================================================================
// Payload Fixtures
// ==============================================================================
//
// Same payloads as `src/test_util.rs`, which is `#[cfg(test)]` and not
// visible to integration tests. Keep the two in step.

pub fn hash_from_byte(b: u8) -> String {
    format!("0x{}", format!("{b:02x}").repeat(32))
}

pub fn address_from_byte(b: u8) -> String {
    format!("0x{}", format!("{b:02x}").repeat(20))
}

pub fn block_json(number: &str, tx_hashes: &[&str]) -> Value {
    json!({
        "number": number,
        "hash": hash_from_byte(0xb1),
        "parentHash": hash_from_byte(0xb0),
        "gasUsed": "0x5208",
        "timestamp": "0x6553f100",
        "transactions": tx_hashes,
    })
}

pub fn tx_json(hash: &str) -> Value {
    json!({
        "hash": hash,
        "blockNumber": "0x10",
        "transactionIndex": "0x0",
        "from": address_from_byte(0x11),
        "to": address_from_byte(0x22),
        "value": "0xde0b6b3a7640000",
        "nonce": "0x1",
    })
}
