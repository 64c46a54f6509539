#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use kr_portal::auth::{generate_jwt, Claims};
use kr_portal::config::AppConfig;
use kr_portal::portal::brokers::create_broker;
use kr_portal::portal::models::{Broker, BrokerDraft, BrokerRole};
use kr_portal::portal::{BlobStore, MemoryBlobStore, MemoryRowStore, RowStore, Session};
use kr_portal::{app, AppState};

/// Router plus handles on its stores, so tests can seed and inspect them.
pub struct TestApp {
    pub router: Router,
    pub config: Arc<AppConfig>,
    pub store: Arc<MemoryRowStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.storage.max_upload_bytes = 1024;
    config
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(MemoryRowStore::new()))
}

pub fn build_test_app_with(store: Arc<MemoryRowStore>) -> TestApp {
    let row_store: Arc<dyn RowStore> = store.clone();
    build_test_app_over(store, row_store)
}

/// Serve requests through `row_store` (typically a wrapper around `store`)
/// while seeding goes straight to `store`.
pub fn build_test_app_over(store: Arc<MemoryRowStore>, row_store: Arc<dyn RowStore>) -> TestApp {
    let config = Arc::new(test_config());
    let blobs = Arc::new(MemoryBlobStore::new());

    let blob_store: Arc<dyn BlobStore> = blobs.clone();
    let state = AppState::new(config.clone(), row_store, blob_store);

    TestApp { router: app(state), config, store, blobs }
}

impl TestApp {
    /// Insert a broker profile directly and return it with a matching token.
    pub async fn broker(&self, name: &str, role: BrokerRole) -> (Broker, String) {
        let seed = Session { user_id: Uuid::new_v4(), email: "seed@kr.test".into(), role: BrokerRole::Admin };
        let draft = BrokerDraft {
            full_name: name.to_string(),
            email: format!("{}@kr.test", name.to_lowercase().replace(' ', ".")),
            role,
            ..Default::default()
        };
        let broker = create_broker(self.store.as_ref(), &seed, None, &draft).await.unwrap();
        let token = self.token_for(&broker);
        (broker, token)
    }

    pub fn token_for(&self, broker: &Broker) -> String {
        let claims = Claims::new(broker.id, broker.email.clone(), broker.role, 1);
        generate_jwt(&claims, &self.config.security.jwt_secret).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(request(Method::POST, uri, Some(token), Some(body))).await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(request(Method::PUT, uri, Some(token), Some(body))).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        return json!(null);
    }
    serde_json::from_slice(&bytes).unwrap()
}
