//! HTTP API integration tests
//!
//! Drives the router with `oneshot` and a stub decision source:
//! - Session and field lifecycle
//! - Status codes per error kind
//! - Fetch, summary, selection and map center

use std::sync::Arc;

use axum::{
    async_trait,
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mapstronaut_backend::{
    config::{ClassifierConfig, Config, ImageryConfig, ServerConfig, WeatherConfig},
    create_app,
    external::ImagePreview,
    services::DecisionSource,
    AppError, AppResult, AppState,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{FeatureRow, IrrigationDecision, MoistureLevel, Polygon, VegetationHealth};
use tower::ServiceExt;

/// Decision source that never leaves the process
struct StubDecisions {
    fail: bool,
}

#[async_trait]
impl DecisionSource for StubDecisions {
    async fn decide_field(&self, _polygon: &Polygon) -> AppResult<IrrigationDecision> {
        if self.fail {
            return Err(AppError::data_fetch("imagery", "401 Unauthorized"));
        }
        Ok(IrrigationDecision {
            irrigate: true,
            evi_index: 0.3,
            moisture_stress: 0.1,
            ndvi_index: 0.25,
            temperature_celsius: Decimal::new(215, 1),
            humidity_percent: 64,
            rain_presence: false,
            features: FeatureRow {
                is_vegetation: true,
                vegetation_health: VegetationHealth::Healthy,
                moisture_index: MoistureLevel::Low,
                rain_presence: false,
            },
        })
    }

    async fn preview_field(&self, _polygon: &Polygon) -> AppResult<ImagePreview> {
        Ok(ImagePreview {
            content_type: "image/png".to_string(),
            width: 2,
            height: 2,
            data_base64: "iVBORw0KGgo=".to_string(),
        })
    }
}

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        weather: WeatherConfig {
            api_endpoint: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
            current_rain_threshold_mm: Decimal::from(5),
            forecast_rain_threshold_mm: Decimal::from(10),
            forecast_horizon_days: 3,
            request_timeout_secs: 1,
        },
        imagery: ImageryConfig {
            auth_url: "http://127.0.0.1:9/token".to_string(),
            api_endpoint: "http://127.0.0.1:9".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            resolution_m: 10,
            window_days: 10,
            request_timeout_secs: 1,
        },
        classifier: ClassifierConfig {
            model_path: "model/irrigation_model.json".to_string(),
        },
    }
}

fn app(fail: bool) -> Router {
    let state = AppState::with_decision_source(test_config(), Arc::new(StubDecisions { fail }));
    create_app(state)
}

fn square_feature() -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0], [0.0, 0.0]]]
        }
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = app(false);
        let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_field_lifecycle() {
        let app = app(false);
        let sid = new_session(&app).await;

        let (status, field) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(square_feature()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(field["area"], 4.0);
        assert_eq!(field["fetched_data"], false);
        assert_eq!(field["display_color"], "unfetched");
        let fid = field["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/sessions/{}/fields/{}/summary", sid, fid),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, fetched) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields/{}/fetch", sid, fid),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["irrigation_decision"], true);
        assert_eq!(fetched["fetched_data"], true);

        let (status, summary) = send(
            &app,
            "GET",
            &format!("/api/v1/sessions/{}/fields/{}/summary", sid, fid),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["needs_watering"], true);
        assert_eq!(summary["soil_moisture"], "55%");

        let (status, fields) =
            send(&app, "GET", &format!("/api/v1/sessions/{}/fields", sid), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fields["fields"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bare_geometry_accepted() {
        let app = app(false);
        let sid = new_session(&app).await;
        let geometry = square_feature()["geometry"].clone();
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(geometry),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_preview() {
        let app = app(false);
        let sid = new_session(&app).await;
        let (_, field) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(square_feature()),
        )
        .await;
        let fid = field["id"].as_str().unwrap();

        let (status, preview) = send(
            &app,
            "GET",
            &format!("/api/v1/sessions/{}/fields/{}/preview", sid, fid),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(preview["content_type"], "image/png");
    }
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[cfg(test)]
mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_degenerate_polygon_is_unprocessable() {
        let app = app(false);
        let sid = new_session(&app).await;
        let line = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(line),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "DEGENERATE_GEOMETRY");
    }

    #[tokio::test]
    async fn test_point_geometry_is_unprocessable() {
        let app = app(false);
        let sid = new_session(&app).await;
        let point = json!({ "type": "Point", "coordinates": [16.24, 52.65] });
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(point),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_bad_gateway_and_record_unchanged() {
        let app = app(true);
        let sid = new_session(&app).await;
        let (_, field) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(square_feature()),
        )
        .await;
        let fid = field["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields/{}/fetch", sid, fid),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "DATA_FETCH_ERROR");

        let (_, stored) = send(
            &app,
            "GET",
            &format!("/api/v1/sessions/{}/fields/{}", sid, fid),
            None,
        )
        .await;
        assert_eq!(stored["fetched_data"], false);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app(false);
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/sessions/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_out_of_range_click_is_bad_request() {
        let app = app(false);
        let sid = new_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/select", sid),
            Some(json!({ "longitude": 200.0, "latitude": 0.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "longitude");
    }
}

// ============================================================================
// Map Interaction Tests
// ============================================================================

#[cfg(test)]
mod map_tests {
    use super::*;

    #[tokio::test]
    async fn test_select_and_center() {
        let app = app(false);
        let sid = new_session(&app).await;
        let (_, field) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/fields", sid),
            Some(square_feature()),
        )
        .await;

        let (status, selection) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/select", sid),
            Some(json!({ "longitude": 1.0, "latitude": 1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(selection["selected"], field["id"]);

        let (_, miss) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/select", sid),
            Some(json!({ "longitude": 50.0, "latitude": 50.0 })),
        )
        .await;
        assert_eq!(miss["selected"], Value::Null);

        let (_, session) = send(&app, "GET", &format!("/api/v1/sessions/{}", sid), None).await;
        assert_eq!(session["selected"], field["id"]);

        let (status, center) =
            send(&app, "GET", &format!("/api/v1/sessions/{}/center", sid), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(center["center"]["longitude"], 0.0);
        assert_eq!(center["center"]["latitude"], 0.0);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(false);
        let sid = new_session(&app).await;
        let (status, _) = send(&app, "DELETE", &format!("/api/v1/sessions/{}", sid), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/v1/sessions/{}", sid), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
