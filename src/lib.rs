//! Manufacturing workflow API
//!
//! Request lifecycle with material reservation, procedures and their
//! subprocesses, session authentication and mail notification jobs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod message_queue;
pub mod migrator;
pub mod notifications;
pub mod services;
pub mod tracing;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::services::AppServices;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    /// Present when a Redis backend is configured; only probed by `/status`.
    pub redis: Option<Arc<redis::Client>>,
    pub services: AppServices,
}

/// CORS policy from configuration. Explicit origins win over the permissive
/// fallback; `None` means no cross-origin access is granted.
pub fn cors_layer(cfg: &AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        return Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_credentials(cfg.cors_allow_credentials),
        );
    }
    if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            development = cfg.is_development(),
            "using permissive CORS because explicit origins were not configured"
        );
        return Some(CorsLayer::permissive());
    }
    None
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Full application router: health probes plus the versioned API.
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.services.auth.clone();
    let cors = cors_layer(&state.config);

    let router = Router::new()
        .merge(handlers::health::health_routes())
        .nest(
            "/api/v1",
            handlers::api_v1_routes(state.config.max_upload_bytes),
        )
        .layer(crate::tracing::configure_http_tracing());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        .layer(middleware::from_fn(crate::tracing::request_id_middleware))
        .with_state(state)
}
