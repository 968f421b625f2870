//! Session HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::Coordinate;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::AppState;

/// A map click
#[derive(Debug, Deserialize, Validate)]
pub struct SelectPointInput {
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MapCenterResponse {
    pub center: Option<Coordinate>,
}

/// Start a new drawing session
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.fields.create_session().await;
    (StatusCode::CREATED, Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.fields.get_session(session_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Drop a session and all of its fields
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.fields.delete_session(session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Select the field under a map click
pub async fn select_field(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<SelectPointInput>,
) -> AppResult<Json<SelectionResponse>> {
    input.validate()?;
    let point = Coordinate::new(input.longitude, input.latitude);
    let selected = state.fields.select_at(session_id, point).await?;
    Ok(Json(SelectionResponse { selected }))
}

/// Where the review map should be centered
pub async fn get_map_center(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<MapCenterResponse>> {
    let center = state.fields.map_center(session_id).await?;
    Ok(Json(MapCenterResponse { center }))
}
