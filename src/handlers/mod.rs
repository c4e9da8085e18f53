pub mod auth;
pub mod common;
pub mod directory;
pub mod health;
pub mod materials;
pub mod notifications;
pub mod procedures;
pub mod requests;
pub mod uploads;
pub mod users;

use axum::Router;

pub use crate::AppState;

/// Everything served under `/api/v1`.
pub fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_routes())
        .nest("/requests", requests::request_routes())
        .nest("/request-inputs", requests::request_input_routes())
        .nest("/materials", materials::material_routes())
        .nest("/origins", materials::origin_routes())
        .nest("/customers", directory::customer_routes())
        .nest("/source-others", directory::source_other_routes())
        .nest("/departments", directory::department_routes())
        .nest("/users", users::user_routes())
        .nest("/procedures", procedures::procedure_routes())
        .nest("/subprocesses", procedures::subprocess_routes())
        .nest("/notifications", notifications::notification_routes())
        .nest("/uploads", uploads::upload_routes(max_upload_bytes))
}
