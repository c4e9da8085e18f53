#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use mfg_workflow_api::{
    auth::{password::hash_password, user, Role},
    build_router,
    config::AppConfig,
    db,
    entities::material::{self, MaterialStatus, MaterialType},
    message_queue::InMemoryMessageQueue,
    services::{code_generator::InMemoryCounterStore, AppServices},
    AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "factory-floor-42";
const TEST_JWT_SECRET: &str =
    "integration_test_secret_with_enough_length_and_variety_0123456789_abcdefghijklmnop";

/// Seeded account with a live session token.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Application wired over in-memory SQLite, in-memory counters and queue,
/// and a scratch upload directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub queue: Arc<InMemoryMessageQueue>,
    pub super_admin: Account,
    pub admin: Account,
    pub user: Account,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_reservation_mode("reserve").await
    }

    pub async fn with_reservation_mode(mode: &str) -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "redis://127.0.0.1:6379".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.reservation_mode = mode.to_string();
        cfg.upload_dir = uploads.path().to_string_lossy().into_owned();
        cfg.max_upload_bytes = 64 * 1024;
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("in-memory database");
        db::run_migrations(&pool).await.expect("migrations");
        let db = Arc::new(pool);

        let queue = Arc::new(InMemoryMessageQueue::new());
        let services = AppServices::new(
            db.clone(),
            &cfg,
            Arc::new(InMemoryCounterStore::new()),
            queue.clone(),
        );
        let state = AppState {
            db,
            config: Arc::new(cfg),
            redis: None,
            services,
        };
        let router = build_router(state.clone());

        let mut app = Self {
            router,
            state,
            queue,
            super_admin: Account::placeholder(),
            admin: Account::placeholder(),
            user: Account::placeholder(),
            _uploads: uploads,
        };
        app.super_admin = app.seed_account("root", Role::SuperAdmin, true).await;
        app.admin = app.seed_account("planner", Role::Admin, true).await;
        app.user = app.seed_account("operator", Role::User, true).await;
        app
    }

    /// Inserts a user directly and, when verified, logs them in.
    pub async fn seed_account(&self, username: &str, role: Role, verified: bool) -> Account {
        let email = format!("{username}@plant.test");
        let now = Utc::now();
        let id = Uuid::new_v4();
        user::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            email: Set(email.clone()),
            full_name: Set(format!("{username} account")),
            password_hash: Set(hash_password(TEST_PASSWORD).expect("hash")),
            role: Set(role),
            department_id: Set(None),
            is_active: Set(true),
            is_verified: Set(verified),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed user");

        let token = if verified {
            self.login(&email, TEST_PASSWORD)
                .await
                .body["access_token"]
                .as_str()
                .expect("access token")
                .to_string()
        } else {
            String::new()
        };
        Account { id, email, token }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"identifier": identifier, "password": password})),
            None,
        )
        .await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("json body"))
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, account: &Account) -> TestResponse {
        self.request(Method::GET, uri, None, Some(&account.token))
            .await
    }

    pub async fn post(&self, uri: &str, body: Value, account: &Account) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(&account.token))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value, account: &Account) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), Some(&account.token))
            .await
    }

    pub async fn patch(&self, uri: &str, body: Value, account: &Account) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body), Some(&account.token))
            .await
    }

    pub async fn delete(&self, uri: &str, account: &Account) -> TestResponse {
        self.request(Method::DELETE, uri, None, Some(&account.token))
            .await
    }

    pub async fn seed_material(
        &self,
        name: &str,
        material_type: MaterialType,
        quantity: i32,
        is_active: bool,
    ) -> material::Model {
        let now = Utc::now();
        material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            code: Set(format!("T-{}", &Uuid::new_v4().simple().to_string()[..8])),
            quantity: Set(quantity),
            unit: Set("kg".to_string()),
            origin_id: Set(None),
            is_active: Set(is_active),
            material_type: Set(material_type),
            status: Set(MaterialStatus::Available),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed material")
    }

    pub async fn material_quantity(&self, id: Uuid) -> i32 {
        use sea_orm::EntityTrait;
        material::Entity::find_by_id(id)
            .one(self.state.db.as_ref())
            .await
            .expect("material lookup")
            .expect("material exists")
            .quantity
    }
}

impl Account {
    fn placeholder() -> Self {
        Self {
            id: Uuid::nil(),
            email: String::new(),
            token: String::new(),
        }
    }
}
