//! Field HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use geojson::GeoJson;
use shared::Polygon;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Convert a drawn GeoJSON Feature or Geometry into a polygon
fn polygon_from_geojson(geojson: &GeoJson) -> AppResult<Polygon> {
    match geojson {
        GeoJson::Feature(feature) => Ok(Polygon::try_from(feature)?),
        GeoJson::Geometry(geometry) => Ok(Polygon::try_from(geometry)?),
        GeoJson::FeatureCollection(_) => Err(AppError::Validation {
            field: "geometry".to_string(),
            message: "Send one drawn polygon per request, not a FeatureCollection".to_string(),
        }),
    }
}

/// Add a drawn polygon to a session
pub async fn create_field(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<GeoJson>,
) -> impl IntoResponse {
    let polygon = match polygon_from_geojson(&input) {
        Ok(polygon) => polygon,
        Err(e) => return e.into_response(),
    };

    match state.fields.add_field(session_id, polygon).await {
        Ok(field) => (StatusCode::CREATED, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List fields of a session in drawing order
pub async fn list_fields(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.fields.list_fields(session_id).await {
        Ok(fields) => (StatusCode::OK, Json(serde_json::json!({ "fields": fields }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single field
pub async fn get_field(
    State(state): State<AppState>,
    Path((session_id, field_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match state.fields.get_field(session_id, field_id).await {
        Ok(field) => (StatusCode::OK, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetch imagery and weather for a field and decide on irrigation
pub async fn fetch_field(
    State(state): State<AppState>,
    Path((session_id, field_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match state.fields.fetch_field(session_id, field_id).await {
        Ok(field) => (StatusCode::OK, Json(field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Dashboard summary of a fetched field
pub async fn get_field_summary(
    State(state): State<AppState>,
    Path((session_id, field_id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let status = state.fields.field_status(session_id, field_id).await?;
    Ok(Json(status))
}

/// True-color satellite preview of a field
pub async fn get_field_preview(
    State(state): State<AppState>,
    Path((session_id, field_id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let preview = state.fields.preview_field(session_id, field_id).await?;
    Ok(Json(preview))
}
