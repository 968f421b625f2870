//! Irrigation decision output

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::features::FeatureRow;

/// Result of one irrigation decision for a polygon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrrigationDecision {
    pub irrigate: bool,
    pub evi_index: f64,
    pub moisture_stress: f64,
    pub ndvi_index: f64,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub rain_presence: bool,
    /// The bucketed features the classifier saw
    pub features: FeatureRow,
}
