use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::{created_response, no_content_response, page_request, PaginatedResponse};
use crate::{
    auth::{AuthRouterExt, AuthUser, Role},
    dto::procedures::{
        CreateProcedureDto, CreateSubprocessDto, ProcedureListQuery, SubprocessProgressDto,
        SwapStepsDto, UpdateProcedureDto, UpdateSubprocessDto,
    },
    errors::ServiceError,
    AppState,
};

async fn list_procedures(
    State(state): State<AppState>,
    Query(query): Query<ProcedureListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let procedures = state.services.procedures.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(procedures)))
}

async fn get_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.procedures.get(id).await?))
}

async fn create_procedure(
    State(state): State<AppState>,
    Json(payload): Json<CreateProcedureDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.procedures.create(payload).await?,
    ))
}

async fn update_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProcedureDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.procedures.update(id, payload).await?))
}

async fn delete_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.procedures.delete(id).await?;
    Ok(no_content_response())
}

async fn list_subprocesses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.procedures.list_subprocesses(id).await?))
}

async fn create_subprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSubprocessDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state
            .services
            .procedures
            .create_subprocess(id, payload)
            .await?,
    ))
}

async fn get_subprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.procedures.get_subprocess(id).await?))
}

async fn update_subprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubprocessDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .procedures
            .update_subprocess(id, payload)
            .await?,
    ))
}

async fn delete_subprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.procedures.delete_subprocess(id).await?;
    Ok(no_content_response())
}

async fn swap_steps(
    State(state): State<AppState>,
    Json(payload): Json<SwapStepsDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let (first, second) = state.services.procedures.swap_steps(payload).await?;
    Ok(Json(json!({ "first": first, "second": second })))
}

async fn progress_subprocess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<SubprocessProgressDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .procedures
            .progress(id, payload, Some(user.user_id))
            .await?,
    ))
}

async fn subprocess_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.procedures.history(id).await?))
}

pub fn procedure_routes() -> Router<AppState> {
    let readers = Router::new()
        .route("/", get(list_procedures))
        .route("/:id", get(get_procedure))
        .route("/:id/subprocesses", get(list_subprocesses))
        .with_auth();

    let admins = Router::new()
        .route("/", post(create_procedure))
        .route("/:id", put(update_procedure).delete(delete_procedure))
        .route("/:id/subprocesses", post(create_subprocess))
        .with_roles(&[Role::Admin]);

    readers.merge(admins)
}

pub fn subprocess_routes() -> Router<AppState> {
    let workers = Router::new()
        .route("/:id", get(get_subprocess))
        .route("/:id/history", get(subprocess_history))
        .route("/:id/progress", post(progress_subprocess))
        .with_auth();

    let admins = Router::new()
        .route("/:id", put(update_subprocess).delete(delete_subprocess))
        .route("/swap", post(swap_steps))
        .with_roles(&[Role::Admin]);

    workers.merge(admins)
}
