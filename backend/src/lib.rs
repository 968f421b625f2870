//! MapStronaut backend
//!
//! HTTP API for drawing fields on a map and deciding, per field, whether it
//! needs irrigation from satellite indices, local weather and a trained model.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::{DecisionTreeModel, ImageryClient, WeatherClient};
use services::{DecisionSource, FieldService, IrrigationDecisionEngine};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fields: FieldService,
}

impl AppState {
    /// Wire the production collaborators from configuration
    pub fn from_config(config: Config) -> AppResult<Self> {
        let imagery = ImageryClient::new(&config.imagery)?;
        let weather = WeatherClient::new(&config.weather)?;
        let classifier = DecisionTreeModel::load(&config.classifier.model_path)?;
        let engine = IrrigationDecisionEngine::new(
            imagery,
            weather,
            classifier,
            config.imagery.window_days,
        );
        Ok(Self::with_decision_source(config, Arc::new(engine)))
    }

    pub fn with_decision_source(config: Config, decisions: Arc<dyn DecisionSource>) -> Self {
        Self {
            config: Arc::new(config),
            fields: FieldService::new(decisions),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "MapStronaut Irrigation API v1.0"
}
