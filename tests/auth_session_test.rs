mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{TestApp, TEST_PASSWORD};
use mfg_workflow_api::{
    auth::{user_session, Role},
    notifications::MAIL_TOPIC,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

#[tokio::test]
async fn logout_all_revokes_the_presented_token() {
    let app = TestApp::new().await;

    let me = app.get("/api/v1/auth/me", &app.user).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], app.user.email);
    assert!(me.body.get("password_hash").is_none());

    let revoked = app
        .request(
            Method::POST,
            "/api/v1/auth/logout-all",
            None,
            Some(&app.user.token),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.body["revoked"], 1);

    let after = app.get("/api/v1/auth/me", &app.user).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.body["code"], "AUTH_SESSION_REVOKED");
}

#[tokio::test]
async fn unverified_login_is_rejected_without_a_session() {
    let app = TestApp::new().await;
    let pending = app.seed_account("trainee", Role::User, false).await;

    let response = app.login(&pending.email, TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "AUTH_UNVERIFIED_ACCOUNT");

    let sessions = user_session::Entity::find()
        .filter(user_session::Column::UserId.eq(pending.id))
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(sessions, 0);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let response = app.login(&app.user.email, "not-the-password-1").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTH_INVALID_CREDENTIALS");
}

#[tokio::test]
async fn a_new_login_replaces_the_previous_session() {
    let app = TestApp::new().await;
    let old_token = app.user.token.clone();

    let second = app.login("operator", TEST_PASSWORD).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["token_type"], "Bearer");
    let new_token = second.body["access_token"].as_str().unwrap();

    let stale = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(&old_token))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(new_token))
        .await;
    assert_eq!(fresh.status, StatusCode::OK);

    let sessions = user_session::Entity::find()
        .filter(user_session::Column::UserId.eq(app.user.id))
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(sessions, 1);
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/auth/me")
        .header("authorization", format!("bearer {}", app.admin.token))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/auth/me")
        .header("authorization", app.admin.token.clone())
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTH_MALFORMED_HEADER");
}

#[tokio::test]
async fn admin_routes_reject_plain_users() {
    let app = TestApp::new().await;

    let denied = app.get("/api/v1/users", &app.user).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "AUTH_INSUFFICIENT_ROLE");

    let allowed = app.get("/api/v1/users", &app.admin).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["pagination"]["total"], 3);
}

#[tokio::test]
async fn only_super_admin_grants_super_admin() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/users/{}/role", app.user.id);

    let by_admin = app
        .patch(&uri, json!({"role": "SUPER_ADMIN"}), &app.admin)
        .await;
    assert_eq!(by_admin.status, StatusCode::FORBIDDEN);

    let by_root = app
        .patch(&uri, json!({"role": "ADMIN"}), &app.super_admin)
        .await;
    assert_eq!(by_root.status, StatusCode::OK);
    assert_eq!(by_root.body["role"], "ADMIN");
}

#[tokio::test]
async fn signup_opens_a_session_and_queues_mail() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/signup",
            Some(json!({
                "username": "new.hire",
                "email": "new.hire@plant.test",
                "full_name": "New Hire",
                "password": "welcome-aboard-7",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["role"], "USER");
    assert!(response.body["access_token"].as_str().is_some());
    assert!(app.queue.pending(MAIL_TOPIC) >= 1);
}

#[tokio::test]
async fn forgot_password_answers_the_same_for_unknown_accounts() {
    let app = TestApp::new().await;
    let known = app
        .request(
            Method::POST,
            "/api/v1/auth/forgot-password",
            Some(json!({"email": app.user.email})),
            None,
        )
        .await;
    let unknown = app
        .request(
            Method::POST,
            "/api/v1/auth/forgot-password",
            Some(json!({"email": "nobody@plant.test"})),
            None,
        )
        .await;
    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body, unknown.body);
}
