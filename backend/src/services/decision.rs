//! Irrigation decision engine
//!
//! Turns a drawn polygon into an irrigate / don't irrigate decision:
//! satellite indices over the bounding box, weather at the centroid, bucketed
//! features, one-hot alignment and a single classifier call.

use axum::async_trait;
use chrono::Utc;
use shared::{FeatureRow, FeatureSchema, IrrigationDecision, Polygon, TimeInterval};

use crate::error::AppResult;
use crate::external::{ImagePreview, ImageryProvider, IrrigationClassifier, WeatherProvider};

/// Object-safe view of the engine held in application state
#[async_trait]
pub trait DecisionSource: Send + Sync {
    async fn decide_field(&self, polygon: &Polygon) -> AppResult<IrrigationDecision>;

    async fn preview_field(&self, polygon: &Polygon) -> AppResult<ImagePreview>;
}

pub struct IrrigationDecisionEngine<I, W, C> {
    imagery: I,
    weather: W,
    classifier: C,
    schema: FeatureSchema,
    window_days: u32,
}

impl<I, W, C> IrrigationDecisionEngine<I, W, C>
where
    I: ImageryProvider,
    W: WeatherProvider,
    C: IrrigationClassifier,
{
    pub fn new(imagery: I, weather: W, classifier: C, window_days: u32) -> Self {
        Self {
            imagery,
            weather,
            classifier,
            schema: FeatureSchema::default(),
            window_days,
        }
    }

    fn window(&self) -> TimeInterval {
        TimeInterval::last_days(Utc::now().date_naive(), self.window_days)
    }

    /// Decide whether the field needs irrigation. Geometry is checked before
    /// any collaborator is contacted; collaborator failures end the call.
    pub async fn decide(&self, polygon: &Polygon) -> AppResult<IrrigationDecision> {
        let centroid = polygon.centroid()?;
        let bbox = polygon.bounding_box();
        let window = self.window();

        let indices = self.imagery.fetch_indices(bbox, window).await?;
        tracing::debug!(
            moisture_stress = indices.moisture_stress,
            evi = indices.evi,
            ndvi = indices.ndvi,
            cloudy = indices.cloudy,
            "Fetched indices"
        );

        let weather = self.weather.fetch_weather(centroid).await?;

        let features = FeatureRow::from_indices(&indices, weather.rain_presence);
        let encoded = self.schema.encode(&features, self.classifier.feature_names())?;
        let irrigate = self.classifier.predict(&encoded)?;

        tracing::info!(
            lat = centroid.latitude,
            lon = centroid.longitude,
            moisture = %features.moisture_index,
            vegetation = %features.vegetation_health,
            rain = weather.rain_presence,
            irrigate,
            "Irrigation decision"
        );

        Ok(IrrigationDecision {
            irrigate,
            evi_index: indices.evi,
            moisture_stress: indices.moisture_stress,
            ndvi_index: indices.ndvi,
            temperature_celsius: weather.temperature_celsius,
            humidity_percent: weather.humidity_percent,
            rain_presence: weather.rain_presence,
            features,
        })
    }

    pub async fn preview(&self, polygon: &Polygon) -> AppResult<ImagePreview> {
        self.imagery
            .fetch_preview(polygon.bounding_box(), self.window())
            .await
    }
}

#[async_trait]
impl<I, W, C> DecisionSource for IrrigationDecisionEngine<I, W, C>
where
    I: ImageryProvider,
    W: WeatherProvider,
    C: IrrigationClassifier,
{
    async fn decide_field(&self, polygon: &Polygon) -> AppResult<IrrigationDecision> {
        self.decide(polygon).await
    }

    async fn preview_field(&self, polygon: &Polygon) -> AppResult<ImagePreview> {
        self.preview(polygon).await
    }
}
