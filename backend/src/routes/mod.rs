//! Route definitions for MapStronaut

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Drawing sessions and their fields
        .nest("/sessions", session_routes())
}

/// Session routes
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_session))
        .route(
            "/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/:session_id/select", post(handlers::select_field))
        .route("/:session_id/center", get(handlers::get_map_center))
        .nest("/:session_id/fields", field_routes())
}

/// Field routes, nested under a session
fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fields).post(handlers::create_field))
        .route("/:field_id", get(handlers::get_field))
        .route("/:field_id/fetch", post(handlers::fetch_field))
        .route("/:field_id/summary", get(handlers::get_field_summary))
        .route("/:field_id/preview", get(handlers::get_field_preview))
}
