use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

use crate::AppState;

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
struct ComponentHealth {
    status: ComponentStatus,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn redis_health(client: &redis::Client) -> ComponentHealth {
    let start = Instant::now();
    let result: Result<String, redis::RedisError> = async {
        let mut conn = client.get_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await
    }
    .await;
    ComponentHealth {
        status: if result.is_ok() {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        },
        latency_ms: start.elapsed().as_millis() as u64,
        error: result.err().map(|e| e.to_string()),
    }
}

/// Liveness: the process answers.
async fn liveness() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness plus build and dependency details.
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let db_result = crate::db::check_connection(&state.db).await;
    let database = ComponentHealth {
        status: if db_result.is_ok() {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        },
        latency_ms: start.elapsed().as_millis() as u64,
        error: db_result.err().map(|e| e.to_string()),
    };

    let redis = match &state.redis {
        Some(client) => Some(redis_health(client).await),
        None => None,
    };

    let code = if matches!(database.status, ComponentStatus::Up) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": if code == StatusCode::OK { "ready" } else { "not_ready" },
            "version": env!("CARGO_PKG_VERSION"),
            "git_hash": env!("GIT_HASH"),
            "build_time": env!("BUILD_TIME"),
            "environment": state.config.environment,
            "reservation_mode": format!("{:?}", state.services.requests.reservation_mode()),
            "uptime_secs": uptime_secs(),
            "checks": {
                "database": database,
                "redis": redis,
            },
        })),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/status", get(status))
}
