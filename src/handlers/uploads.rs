use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    response::IntoResponse,
    routing::{delete, post},
    Router,
};
use serde_json::json;
use tracing::debug;

use super::common::created_response;
use crate::{auth::AuthRouterExt, errors::ServiceError, AppState};

/// Stores every file part of the form. Plain text parts are ignored.
async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let mut stored = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        let Some(original) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "skipping non-file part");
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::BadRequest(format!("unreadable upload: {}", e)))?;
        stored.push(
            state
                .services
                .uploads
                .store(Some(&original), &bytes)
                .await?,
        );
    }

    if stored.is_empty() {
        return Err(ServiceError::BadRequest(
            "no file found in upload".to_string(),
        ));
    }
    Ok(created_response(json!({ "files": stored })))
}

async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.services.uploads.delete(&name).await?;
    Ok(Json(json!({ "name": name, "status": outcome })))
}

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_files))
        .route("/:name", delete(delete_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_auth()
}
