//! External data sources and the irrigation model
//!
//! Each collaborator of the decision engine sits behind a trait so the engine
//! can run against stubs in tests.

use std::future::Future;

use shared::{BoundingBox, Coordinate, RawIndices, TimeInterval, WeatherReading};

use crate::error::AppResult;

pub mod classifier;
pub mod imagery;
pub mod weather;

pub use classifier::DecisionTreeModel;
pub use imagery::{ImagePreview, ImageryClient};
pub use weather::WeatherClient;

/// Satellite index provider
pub trait ImageryProvider: Send + Sync {
    /// Cloud-filtered index means over `bbox` during `window`
    fn fetch_indices(
        &self,
        bbox: BoundingBox,
        window: TimeInterval,
    ) -> impl Future<Output = AppResult<RawIndices>> + Send;

    fn fetch_preview(
        &self,
        bbox: BoundingBox,
        window: TimeInterval,
    ) -> impl Future<Output = AppResult<ImagePreview>> + Send;
}

/// Current conditions and short-range rain outlook at a point
pub trait WeatherProvider: Send + Sync {
    fn fetch_weather(
        &self,
        location: Coordinate,
    ) -> impl Future<Output = AppResult<WeatherReading>> + Send;
}

/// Binary irrigation model over one-hot encoded features
pub trait IrrigationClassifier: Send + Sync {
    /// Input columns in the order `predict` expects them
    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> AppResult<bool>;
}
