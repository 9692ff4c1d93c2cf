#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use snack_api::config::Config;
use snack_api::infrastructure::database::sqlite::init_sqlite;
use snack_api::infrastructure::sms::{SmsError, SmsSender};
use snack_api::server::{create_app, AppState};

pub const BOUNDARY: &str = "snack-test-boundary";

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last_to(&self, phone: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, message)| message)
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        self.sent
            .lock()
            .expect("sms log poisoned")
            .push((to.to_string(), message.to_string()));
        Ok(())
    }
}

/// Gateway that is always down.
pub struct FailingSms;

#[async_trait]
impl SmsSender for FailingSms {
    async fn send(&self, _to: &str, _message: &str) -> Result<(), SmsError> {
        Err(SmsError::Rejected {
            status: 503,
            body: "gateway offline".to_string(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub sms: Arc<RecordingSms>,
    pub uploads: TempDir,
}

pub fn test_config(uploads: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.uploads.dir = uploads.path().to_string_lossy().into_owned();
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let mut config = test_config(&uploads);
    customize(&mut config);

    let sms = Arc::new(RecordingSms::default());
    let (router, db) = build(config, sms.clone()).await;

    TestApp {
        router,
        db,
        sms,
        uploads,
    }
}

pub async fn build(config: Config, sms: Arc<dyn SmsSender>) -> (Router, SqlitePool) {
    let db = init_sqlite(&config).await.expect("in-memory database");
    let state = AppState::new(config, db.clone(), sms);
    let router = create_app(state).await.expect("router");
    (router, db)
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(empty(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(empty(Method::DELETE, uri)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(json_request(Method::POST, uri, &body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(json_request(Method::PUT, uri, &body)).await
    }

    pub async fn create_snack(&self, name: &str, price: &str, stock: &str) -> Value {
        let body = multipart_body(&[("name", name), ("price", price), ("stock", stock)], &[]);
        let (status, snack) = self
            .request(multipart_request(Method::POST, "/api/snacks", body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create snack failed: {}", snack);
        snack
    }

    /// Requests an OTP and returns the code the fake gateway received.
    pub async fn request_otp(&self, phone: &str) -> String {
        let (status, _) = self
            .post_json("/api/orders/otp/send", serde_json::json!({ "phone": phone }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let message = self.sms.last_to(phone).expect("OTP message was sent");
        otp_code(&message)
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

pub fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn multipart_request(method: Method, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request")
}

/// `files` are `(field, file name, bytes)`.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn otp_code(message: &str) -> String {
    let start = message.find("code is ").expect("code in message") + "code is ".len();
    message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect()
}
