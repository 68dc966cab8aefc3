#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tank_api::{create_api_router, ApiConfig, AppState};
use tank_core::ImageCache;
use tank_storage::{ArtifactStore, InMemoryImageCacheStore, NoopArtifactStore};
use tower::ServiceExt;

use super::test_auth_support::test_auth_config;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryImageCacheStore>,
}

/// Full router over an in-memory store holding `records`.
pub async fn test_app(records: &[ImageCache]) -> TestApp {
    test_app_with_artifacts(records, Arc::new(NoopArtifactStore)).await
}

pub async fn test_app_with_artifacts(
    records: &[ImageCache],
    artifacts: Arc<dyn ArtifactStore>,
) -> TestApp {
    let store = Arc::new(
        tank_test_utils::fixtures::seeded_store(records)
            .await
            .expect("Seeding the store should succeed"),
    );
    let api_config = ApiConfig::default();
    let state = AppState::with_store(store.clone(), artifacts, api_config.paging);
    let router = create_api_router(state, &api_config, test_auth_config())
        .expect("Router should build outside production");
    TestApp { router, store }
}

pub fn get(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", api_key)
        .body(Body::empty())
        .expect("Request should build")
}

pub fn post_form(uri: &str, api_key: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-api-key", api_key)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("Request should build")
}

/// Send one request; returns the status and the JSON body (`Null` if empty).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
