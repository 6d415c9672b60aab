#![allow(dead_code)]

use async_trait::async_trait;
use delivery_lib::application::ports::UrlOpener;
use delivery_lib::infrastructure::database::ConnectionPool;
use delivery_lib::infrastructure::storage::FileSecureStorage;
use delivery_lib::shared::config::{AppConfig, Platform};
use delivery_lib::{AppError, AppState};
use serde_json::Value;
use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

#[derive(Debug)]
pub struct MockHttpResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl MockHttpResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body.to_string()),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: Some(body.to_string()),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is json")
    }
}

fn header_value(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

/// Serves `responses` in order, one per request, and reports each request.
pub fn spawn_json_sequence_server(
    responses: Vec<MockHttpResponse>,
) -> (String, Receiver<CapturedRequest>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("mock server");
    let base_url = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        for response_spec in responses {
            let mut request = match server.recv_timeout(StdDuration::from_secs(8)) {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(_) => break,
            };

            let mut raw = Vec::new();
            let _ = request.as_reader().read_to_end(&mut raw);
            let captured = CapturedRequest {
                method: request.method().as_str().to_string(),
                path: request.url().split('?').next().unwrap_or("").to_string(),
                authorization: header_value(&request, "Authorization"),
                content_type: header_value(&request, "Content-Type"),
                body: String::from_utf8_lossy(&raw).into_owned(),
            };
            let _ = tx.send(captured);

            let response = match response_spec.body {
                Some(body) => Response::from_string(body).with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("content-type header"),
                ),
                None => Response::from_string(String::new()),
            };
            let _ = request.respond(response.with_status_code(response_spec.status));
        }
    });

    (base_url, rx, handle)
}

pub fn join_with_timeout(handle: thread::JoinHandle<()>, timeout: StdDuration) {
    let start = std::time::Instant::now();
    while !handle.is_finished() {
        assert!(
            start.elapsed() < timeout,
            "mock server join timed out after {:?}",
            timeout
        );
        thread::sleep(StdDuration::from_millis(10));
    }
    handle.join().expect("mock server thread panicked");
}

pub fn next_request(rx: &Receiver<CapturedRequest>) -> CapturedRequest {
    rx.recv_timeout(StdDuration::from_secs(5))
        .expect("request captured")
}

#[derive(Default)]
pub struct NullOpener {
    pub opened: Mutex<Vec<String>>,
}

#[async_trait]
impl UrlOpener for NullOpener {
    async fn open(&self, url: &str) -> Result<(), AppError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub opener: Arc<NullOpener>,
    _dir: TempDir,
}

/// Full client core against `base_url`, with in-memory sqlite and file-backed
/// token storage in a temp dir.
pub async fn build_app(base_url: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    config.storage.data_dir = dir.path().to_string_lossy().into_owned();
    config.preferences.debounce_ms = 50;
    config.platform = Platform::Android;

    let pool = ConnectionPool::from_memory().await.expect("sqlite pool");
    let secure = Arc::new(FileSecureStorage::new(dir.path().join("secure")));
    let opener = Arc::new(NullOpener::default());
    let state = AppState::with_components(config, pool, secure, opener.clone())
        .await
        .expect("app state");
    TestApp {
        state,
        opener,
        _dir: dir,
    }
}

pub fn login_body(token: &str) -> Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {
            "id": "driver-1",
            "email": "driver@example.com",
            "name": "Ivo",
            "role": "driver",
            "on_duty": false
        }
    })
}

pub fn routes_body() -> Value {
    serde_json::json!([
        {
            "id": "r1",
            "name": "Zagreb north",
            "date": "2026-10-19",
            "depot": "Main",
            "stops": [
                {"id": "s1", "sequence": 1, "address": "Ilica 1", "latitude": 45.81, "longitude": 15.97, "status": "pending", "eta": "09:00"},
                {"id": "s2", "sequence": 2, "address": "Vlaska 2", "latitude": 45.82, "longitude": 15.98, "status": "pending"}
            ]
        }
    ])
}
