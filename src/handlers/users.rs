use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, page_request, PaginatedResponse};
use crate::{
    auth::{AuthRouterExt, AuthUser, Role},
    dto::users::{ChangeRoleDto, CreateUserDto, UpdateUserDto, UserListQuery, VerifyUserDto},
    errors::ServiceError,
    AppState,
};

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let users = state.services.users.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(users)))
}

async fn create_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<CreateUserDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.users.create(payload, &actor).await?,
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.users.get(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.users.update(id, payload).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.users.delete(id, &actor).await?;
    Ok(no_content_response())
}

async fn verify_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyUserDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.users.verify(id, payload).await?))
}

async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: AuthUser,
    Json(payload): Json<ChangeRoleDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.users.change_role(id, payload, &actor).await?,
    ))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/verify", patch(verify_user))
        .route("/:id/role", patch(change_role))
        .with_roles(&[Role::Admin])
}
