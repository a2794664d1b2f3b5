#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, routing::post, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{AuthRouterExt, AuthService, Role};
use crate::repositories::SeaOrmInventoryRepository;
use handlers::inventory::InventoryHandlerState;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub inventory_service: services::inventory::InventoryService,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires the SeaORM repository into the inventory service.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig, auth: Arc<AuthService>) -> Self {
        let repo = Arc::new(SeaOrmInventoryRepository::new(db.clone()));
        Self {
            inventory_service: services::inventory::InventoryService::new(repo),
            db,
            config,
            auth,
        }
    }
}

impl InventoryHandlerState for AppState {
    fn inventory_service(&self) -> &services::inventory::InventoryService {
        &self.inventory_service
    }
}

/// Inventory routes gated by role.
pub fn api_routes() -> Router<AppState> {
    let inventory_read = handlers::inventory::inventory_read_router::<AppState>()
        .with_roles(&[Role::Admin, Role::User]);

    let inventory_admin =
        handlers::inventory::inventory_admin_router::<AppState>().with_roles(&[Role::Admin]);

    Router::new().merge(inventory_read).merge(inventory_admin)
}

/// Builds the CORS layer from configured origins, falling back to permissive
/// only where configuration allows it.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let configured_origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                None
            } else {
                HeaderValue::from_str(trimmed).ok()
            }
        })
        .collect();

    if !configured_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(configured_origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Assembles the full application: inventory API, token issuance, health,
/// API docs and the global middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let auth_service = state.auth.clone();
    let db = state.db.clone();

    Router::<AppState>::new()
        .merge(api_routes())
        .route("/token", post(auth::issue_token_handler))
        .with_state(state)
        .merge(health::health_routes(db))
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}

pub mod prelude {
    pub use crate::auth::{AuthService, Role};
    pub use crate::config::AppConfig;
    pub use crate::errors::*;
    pub use crate::models::*;
    pub use crate::services::inventory::InventoryService;
    pub use crate::{build_app, AppState};
}
