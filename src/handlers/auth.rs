use axum::{
    extract::{Json, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::common::{created_response, no_content_response, user_agent};
use crate::{
    auth::{user, AuthRouterExt, AuthUser, IssuedToken},
    dto::users::{ForgotPasswordDto, LoginDto, SignupDto},
    errors::ServiceError,
    notifications::MailKind,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: user::Model,
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginDto>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let (token, user) = state
        .services
        .auth
        .login(&payload.identifier, &payload.password, user_agent(&headers))
        .await?;
    state
        .services
        .mail
        .dispatch_or_log(MailKind::Login, &user.email)
        .await;
    Ok(Json(SessionResponse { token, user }))
}

async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SignupDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.signup(payload).await?;
    let token = state
        .services
        .auth
        .issue_session(&user, user_agent(&headers))
        .await?;
    state
        .services
        .mail
        .dispatch_or_log(MailKind::Signup, &user.email)
        .await;
    info!(user_id = %user.id, "signup completed");
    Ok(created_response(SessionResponse { token, user }))
}

/// Always answers the same way so callers cannot probe for accounts.
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordDto>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    if let Some(user) = state.services.users.find_by_email(&payload.email).await? {
        if user.is_active {
            state
                .services
                .mail
                .dispatch_or_log(MailKind::ForgotPassword, &user.email)
                .await;
        }
    }
    Ok(Json(json!({
        "message": "If the account exists, a reset email has been sent"
    })))
}

async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.auth.logout(&user).await?;
    Ok(no_content_response())
}

async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let revoked = state.services.auth.logout_all(user.user_id).await?;
    Ok(Json(json!({ "revoked": revoked })))
}

async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.users.get(user.user_id).await?))
}

pub fn auth_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/forgot-password", post(forgot_password));

    let session = Router::new()
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/me", get(me))
        .with_auth();

    public.merge(session)
}
