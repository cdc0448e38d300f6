#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    Router,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

type Reply = Arc<dyn Fn(&str, &str) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    log: Arc<Mutex<Vec<Recorded>>>,
}

async fn handle(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.log.lock().push(Recorded {
        path: uri.path().to_owned(),
        content_type,
        body: body.clone(),
    });
    (state.reply)(uri.path(), &body)
}

/// An HTTP server that records every request and answers with `reply(path, body)`.
pub struct TestServer {
    addr: SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    fn router<F>(reply: F) -> (Router, Arc<Mutex<Vec<Recorded>>>)
    where
        F: Fn(&str, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply: Arc::new(reply),
            log: Arc::clone(&log),
        };
        (Router::new().fallback(handle).with_state(state), log)
    }

    /// Serves on the current tokio runtime.
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&str, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let (app, log) = Self::router(reply);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Self { addr, log }
    }

    /// Serves from a runtime on its own thread, for blocking callers.
    pub fn start_on_thread<F>(reply: F) -> Self
    where
        F: Fn(&str, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let (app, log) = Self::router(reply);
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();
        Self { addr, log }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().clone()
    }

    /// Waits until at least `n` requests have arrived.
    pub async fn wait_for(&self, n: usize) -> Vec<Recorded> {
        for _ in 0..200 {
            if self.log.lock().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.requests()
    }
}

/// Answers every request with `200 OK` and a fixed body.
pub fn always(body: &'static str) -> impl Fn(&str, &str) -> (StatusCode, String) + Send + Sync {
    move |_, _| (StatusCode::OK, body.to_owned())
}

/// Pulls the positional arguments out of either request envelope.
pub fn args_of(body: &str) -> Vec<Value> {
    match serde_json::from_str(body).unwrap() {
        Value::Array(args) => args,
        Value::Object(mut envelope) => match envelope.remove("Value") {
            Some(Value::Array(args)) => args,
            other => panic!("bad tagged envelope: {other:?}"),
        },
        other => panic!("bad envelope: {other}"),
    }
}

/// Answers with the first argument of the request.
pub fn echo_first(_path: &str, body: &str) -> (StatusCode, String) {
    let args = args_of(body);
    (StatusCode::OK, args[0].to_string())
}
