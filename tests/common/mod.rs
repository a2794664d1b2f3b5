#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use base64::Engine as _;
use inventory_api::{
    auth::{AuthConfig, AuthService, CredentialStore, Role},
    config::AppConfig,
    db, AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("admin", "admin-pass");
pub const USER: (&str, &str) = ("user", "user-pass");

/// Application backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;
        cfg.jwt_secret =
            "integration-test-signing-key-0123456789-abcdefghijklmnopqrstuvwxyz".to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let credentials = CredentialStore::with_cost(8, 1)
            .and_then(|store| store.with_account(ADMIN.0, ADMIN.1, Role::Admin))
            .and_then(|store| store.with_account(USER.0, USER.1, Role::User))
            .expect("credential store");
        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg), credentials));

        let state = AppState::new(Arc::new(pool), cfg, auth_service);
        let router = inventory_api::build_app(state.clone());

        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, Some(basic(ADMIN.0, ADMIN.1)), body)
            .await
    }

    pub async fn as_user(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, Some(basic(USER.0, USER.1)), body)
            .await
    }

    /// Creates a product as USER and returns its id.
    pub async fn create_product(&self, body: Value) -> i64 {
        let response = self.as_user(Method::POST, "/inventory", Some(body)).await;
        assert_eq!(response.status(), 201);
        response_json(response).await["productId"]
            .as_i64()
            .expect("product id")
    }

    /// Records a transaction as USER and returns its id.
    pub async fn create_detail(&self, body: Value) -> i64 {
        let response = self
            .as_user(Method::POST, "/inventory/details", Some(body))
            .await;
        assert_eq!(response.status(), 201);
        response_json(response).await["transactionId"]
            .as_i64()
            .expect("transaction id")
    }
}

pub fn basic(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"))
    )
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
