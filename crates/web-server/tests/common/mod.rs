#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use configuration::AuthSettings;
use core_types::{Client, ClientInput};
use database::{ClientStore, DbError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use web_server::{
    auth::{CredentialVerifier, StaticCredentials},
    build_router, AppState,
};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cret";

/// In-memory stand-in for the database that counts every call it receives.
#[derive(Default)]
pub struct MemoryStore {
    clients: Mutex<BTreeMap<i64, Client>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn list_clients(&self) -> Result<Vec<Client>, DbError> {
        self.record();
        Ok(self.clients.lock().await.values().rev().cloned().collect())
    }

    async fn get_client(&self, id: i64) -> Result<Client, DbError> {
        self.record();
        self.clients.lock().await.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn create_client(&self, input: &ClientInput) -> Result<Client, DbError> {
        self.record();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let client = Client {
            id,
            name: input.name().to_string(),
            balance: input.balance(),
        };
        self.clients.lock().await.insert(id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, DbError> {
        self.record();
        let mut clients = self.clients.lock().await;
        let client = clients.get_mut(&id).ok_or(DbError::NotFound)?;
        client.name = input.name().to_string();
        client.balance = input.balance();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<(), DbError> {
        self.record();
        self.clients
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

/// A store whose every call fails as if the pool were saturated.
pub struct ExhaustedStore;

#[async_trait]
impl ClientStore for ExhaustedStore {
    async fn list_clients(&self) -> Result<Vec<Client>, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn get_client(&self, _id: i64) -> Result<Client, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn create_client(&self, _input: &ClientInput) -> Result<Client, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn update_client(&self, _id: i64, _input: &ClientInput) -> Result<Client, DbError> {
        Err(DbError::PoolExhausted)
    }

    async fn delete_client(&self, _id: i64) -> Result<(), DbError> {
        Err(DbError::PoolExhausted)
    }
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        session_ttl_secs: 3600,
        cookie_name: "tally_session".to_string(),
        secure_cookie: false,
    }
}

pub fn app_with(store: Arc<dyn ClientStore>) -> Router {
    let credentials: Arc<dyn CredentialVerifier> = Arc::new(StaticCredentials::new(USERNAME, PASSWORD));
    let state = Arc::new(AppState::new(store, credentials, &auth_settings()));
    build_router(state)
}

pub fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (app_with(store.clone()), store)
}

/// Extracts `name=value` from the first `Set-Cookie` header.
pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Logs in through the JSON endpoint and returns the cookie to send back.
pub async fn login(app: &Router) -> String {
    let body = serde_json::json!({ "username": USERNAME, "password": PASSWORD });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/login", None, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).expect("login should set a session cookie")
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status with the parsed JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
