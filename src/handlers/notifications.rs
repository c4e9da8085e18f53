use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use super::common::{page_request, PaginatedResponse};
use crate::{
    auth::{AuthRouterExt, AuthUser, Role},
    dto::notifications::{BroadcastDto, NotificationListQuery},
    errors::ServiceError,
    AppState,
};

async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let notifications = state
        .services
        .notifications
        .list_for_user(user.user_id, &query, page)
        .await?;
    Ok(Json(PaginatedResponse::from(notifications)))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .notifications
            .mark_read(user.user_id, id)
            .await?,
    ))
}

async fn broadcast(
    State(state): State<AppState>,
    Json(payload): Json<BroadcastDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.notifications.broadcast(payload).await?))
}

pub fn notification_routes() -> Router<AppState> {
    let mine = Router::new()
        .route("/", get(list_mine))
        .route("/:id/read", patch(mark_read))
        .with_auth();
    let admins = Router::new()
        .route("/broadcast", post(broadcast))
        .with_roles(&[Role::Admin]);
    mine.merge(admins)
}
