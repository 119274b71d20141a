//! In-process stand-in for the chat backend, used by the unit tests.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    hold: Option<Arc<Notify>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    hold: Option<Arc<Notify>>,
}

impl StubBackend {
    /// Answer every request with `status` and `body`.
    pub async fn reply(status: u16, body: &str) -> Self {
        Self::start(status, body, None).await
    }

    /// Like [`StubBackend::reply`], but each answer waits for [`StubBackend::release`].
    pub async fn held(status: u16, body: &str) -> Self {
        Self::start(status, body, Some(Arc::new(Notify::new()))).await
    }

    async fn start(status: u16, body: &str, hold: Option<Arc<Notify>>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            hold: hold.clone(),
            requests: requests.clone(),
        };

        let app = Router::new().fallback(record).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{addr}"),
            requests,
            hold,
        }
    }

    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.notify_one();
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<StubState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        content_type,
        body,
    });

    if let Some(hold) = &state.hold {
        hold.notified().await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// A URL nothing is listening on.
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
