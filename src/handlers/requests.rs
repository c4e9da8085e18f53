use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, page_request, PaginatedResponse};
use crate::{
    auth::{AuthRouterExt, AuthUser, Role},
    dto::requests::{
        AddRequestMaterialDto, CreateApprovalInfoDto, CreateRequestDto, RemoveRequestMaterialDto,
        RequestInputDto, RequestInputListQuery, RequestListQuery, UpdateApprovalInfoDto,
        UpdateRequestDto, UpdateRequestStatusDto,
    },
    errors::ServiceError,
    AppState,
};

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let requests = state.services.requests.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(requests)))
}

async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRequestDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .requests
        .create(payload, Some(user.user_id))
        .await?;
    Ok(created_response(created))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.requests.get(id).await?))
}

async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequestDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.requests.update(id, payload).await?))
}

async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.requests.remove(id).await?;
    Ok(no_content_response())
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequestStatusDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.requests.update_status(id, payload).await?,
    ))
}

async fn update_status_with_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<UpdateRequestStatusDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .requests
        .update_status_with_history(id, payload, Some(user.user_id))
        .await?;
    Ok(Json(updated))
}

async fn status_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.requests.status_history(id).await?))
}

async fn add_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddRequestMaterialDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let line = state.services.requests.add_material(id, payload).await?;
    Ok(created_response(line))
}

async fn remove_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RemoveRequestMaterialDto>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.requests.remove_material(id, payload).await?;
    Ok(no_content_response())
}

async fn get_approval_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.requests.get_approval_info(id).await?))
}

async fn create_approval_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<CreateApprovalInfoDto>,
) -> Result<impl IntoResponse, ServiceError> {
    let info = state
        .services
        .requests
        .create_approval_info(id, payload, Some(user.user_id))
        .await?;
    Ok(created_response(info))
}

async fn update_approval_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApprovalInfoDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .requests
            .update_approval_info(id, payload)
            .await?,
    ))
}

async fn statistics_by_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.requests.statistics_by_status().await?))
}

async fn statistics_by_material_type(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.requests.statistics_by_material_type().await?,
    ))
}

async fn list_request_inputs(
    State(state): State<AppState>,
    Query(query): Query<RequestInputListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let inputs = state
        .services
        .requests
        .list_request_inputs(&query, page)
        .await?;
    Ok(Json(PaginatedResponse::from(inputs)))
}

async fn upsert_request_input(
    State(state): State<AppState>,
    Json(payload): Json<RequestInputDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.requests.upsert_request_input(payload).await?,
    ))
}

pub fn request_routes() -> Router<AppState> {
    let members = Router::new()
        .route("/", get(list_requests).post(create_request))
        .route(
            "/:id",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route("/:id/status", patch(update_status))
        .route(
            "/:id/status-history",
            get(status_history).post(update_status_with_history),
        )
        .route("/:id/materials", post(add_material).delete(remove_material))
        .route("/:id/approval-info", get(get_approval_info))
        .route("/statistics/status", get(statistics_by_status))
        .route("/statistics/material-type", get(statistics_by_material_type))
        .with_auth();

    let approvers = Router::new()
        .route(
            "/:id/approval-info",
            post(create_approval_info).put(update_approval_info),
        )
        .with_roles(&[Role::Admin]);

    members.merge(approvers)
}

pub fn request_input_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_request_inputs).put(upsert_request_input))
        .with_auth()
}
