//! Customers, other request sources and departments.

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
    dto::directory::{
        CreateCustomerDto, NamedEntryDto, SearchQuery, UpdateCustomerDto, UpdateNamedEntryDto,
    },
    errors::ServiceError,
    AppState,
};

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let customers = state.services.customers.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(customers)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.customers.get(id).await?))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.customers.create(payload).await?,
    ))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.customers.update(id, payload).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(no_content_response())
}

async fn list_source_others(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let sources = state.services.source_others.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(sources)))
}

async fn get_source_other(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.source_others.get(id).await?))
}

async fn create_source_other(
    State(state): State<AppState>,
    Json(payload): Json<NamedEntryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.source_others.create(payload).await?,
    ))
}

async fn update_source_other(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamedEntryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.source_others.update(id, payload).await?,
    ))
}

async fn delete_source_other(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.source_others.delete(id).await?;
    Ok(no_content_response())
}

async fn list_departments(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(&state, query.page, query.limit);
    let departments = state.services.departments.list(&query, page).await?;
    Ok(Json(PaginatedResponse::from(departments)))
}

async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.departments.get(id).await?))
}

async fn create_department(
    State(state): State<AppState>,
    Json(payload): Json<NamedEntryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(
        state.services.departments.create(payload).await?,
    ))
}

async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamedEntryDto>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.departments.update(id, payload).await?))
}

async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.departments.delete(id).await?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    let readers = Router::new()
        .route("/", get(list_customers))
        .route("/:id", get(get_customer))
        .with_auth();
    let admins = Router::new()
        .route("/", post(create_customer))
        .route("/:id", put(update_customer).delete(delete_customer))
        .with_roles(&[Role::Admin]);
    readers.merge(admins)
}

pub fn source_other_routes() -> Router<AppState> {
    let readers = Router::new()
        .route("/", get(list_source_others))
        .route("/:id", get(get_source_other))
        .with_auth();
    let admins = Router::new()
        .route("/", post(create_source_other))
        .route("/:id", put(update_source_other).delete(delete_source_other))
        .with_roles(&[Role::Admin]);
    readers.merge(admins)
}

pub fn department_routes() -> Router<AppState> {
    let readers = Router::new()
        .route("/", get(list_departments))
        .route("/:id", get(get_department))
        .with_auth();
    let admins = Router::new()
        .route("/", post(create_department))
        .route("/:id", put(update_department).delete(delete_department))
        .with_roles(&[Role::Admin]);
    readers.merge(admins)
}
