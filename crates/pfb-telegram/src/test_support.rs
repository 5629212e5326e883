//! Local stand-in for the Bot API used by this crate's tests.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Uri},
    Router,
};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct Captured {
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub type Log = Arc<Mutex<Vec<Captured>>>;

/// Serve on an ephemeral port, record every request, answer each with `reply`.
/// Returns the base URL and the request log.
pub async fn fake_api(reply: &'static str) -> (String, Log) {
    async fn record(
        State((log, reply)): State<(Log, &'static str)>,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> &'static str {
        log.lock().unwrap().push(Captured {
            path: uri.path().to_string(),
            content_type: headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
            body: body.to_vec(),
        });
        reply
    }

    let log: Log = Arc::default();
    let app = Router::new()
        .fallback(record)
        .with_state((log.clone(), reply));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), log)
}
