use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use super::common::{created_response, no_content_response, page_request, PaginatedResponse};
use crate::{
    auth::{AuthRouterExt, Role},
    dto::{
        directory::SearchQuery,
        materials::{CreateMaterialDto, CreateOriginDto, MaterialListQuery, UpdateMaterialDto},
    },
    errors::ServiceError,
    AppState,
};

async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let materials = state.services.materials.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(materials)))
}

async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.materials.get(id).await?))
}

async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<CreateMaterialDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.materials.create(payload).await?,
    ))
}

async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterialDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.materials.update(id, payload).await?))
}

async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.materials.delete(id).await?;
    Ok(no_content_response())
}

async fn list_origins(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let origins = state.services.materials.list_origins(&query, page).await?;
    Ok(Json(PaginatedResponse::from(origins)))
}

async fn create_origin(
    State(state): State<AppState>,
    Json(payload): Json<CreateOriginDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.materials.create_origin(payload).await?,
    ))
}

pub fn material_routes() -> Router<AppState> {
    let readers = Router::new()
        .route("/", get(list_materials))
        .route("/:id", get(get_material))
        .with_auth();

    let admins = Router::new()
        .route("/", post(create_material))
        .route("/:id", put(update_material).delete(delete_material))
        .with_roles(&[Role::Admin]);

    readers.merge(admins)
}

pub fn origin_routes() -> Router<AppState> {
    let readers = Router::new().route("/", get(list_origins)).with_auth();
    let admins = Router::new()
        .route("/", post(create_origin))
        .with_roles(&[Role::Admin]);
    readers.merge(admins)
}
