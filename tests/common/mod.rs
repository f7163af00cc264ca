#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use praromvik_api::database::MemoryStore;
use praromvik_api::handlers::{self, AppState};
use praromvik_api::services::RecordService;

/// The full router over a private in-memory store
pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let records = RecordService::new(Arc::new(store.clone()), Duration::from_secs(5));
        Self {
            router: handlers::router(AppState::new(records)),
            store,
        }
    }

    /// Send one request; the body comes back as JSON (`Null` when empty)
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).context("failed to build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router failed")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| {
                format!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, None).await
    }
}

/// Assert the success envelope and hand back its `data`
pub fn data(body: &Value) -> &Value {
    assert_eq!(body["success"], true, "expected success envelope: {}", body);
    &body["data"]
}

/// Assert the error envelope and hand back its `code`
pub fn error_code(body: &Value) -> &str {
    assert_eq!(body["error"], true, "expected error envelope: {}", body);
    body["code"].as_str().unwrap_or_default()
}
