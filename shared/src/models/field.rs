//! Drawn field records and their dashboard presentation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decision::IrrigationDecision;
use super::indices::{soil_moisture_percent, vegetation_health_percent};
use crate::geometry::{GeometryError, Polygon};
use crate::types::{format_metric, Coordinate, MetricKind};

/// One user-drawn polygon with its fetched metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRecord {
    pub id: Uuid,
    pub polygon: Polygon,
    pub centroid: Coordinate,
    /// Square degrees
    pub area: f64,
    pub fetched_data: bool,
    pub irrigation_decision: Option<bool>,
    pub soil_moisture_percent: Option<f64>,
    pub vegetation_health_percent: Option<f64>,
    pub temperature_celsius: Option<Decimal>,
    pub humidity_percent: Option<i32>,
    pub display_color: DisplayColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FieldRecord {
    /// Wrap a polygon; fails when the polygon has no area-weighted centroid
    pub fn new(polygon: Polygon) -> Result<Self, GeometryError> {
        let centroid = polygon.centroid()?;
        let area = polygon.area();
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            polygon,
            centroid,
            area,
            fetched_data: false,
            irrigation_decision: None,
            soil_moisture_percent: None,
            vegetation_health_percent: None,
            temperature_celsius: None,
            humidity_percent: None,
            display_color: DisplayColor::Unfetched,
            created_at: now,
            updated_at: now,
            fetched_at: None,
        })
    }

    /// Store a decision. Repeated calls overwrite the previous one.
    pub fn record_decision(&mut self, decision: &IrrigationDecision) {
        let now = Utc::now();
        self.irrigation_decision = Some(decision.irrigate);
        self.soil_moisture_percent = Some(soil_moisture_percent(decision.moisture_stress));
        self.vegetation_health_percent = Some(vegetation_health_percent(decision.evi_index));
        self.temperature_celsius = Some(decision.temperature_celsius);
        self.humidity_percent = Some(decision.humidity_percent);
        self.fetched_data = true;
        self.fetched_at = Some(now);
        self.updated_at = now;
        self.recompute_color();
    }

    pub fn recompute_color(&mut self) -> DisplayColor {
        self.display_color = if self.fetched_data {
            DisplayColor::for_metrics(
                self.irrigation_decision.unwrap_or(false),
                self.soil_moisture_percent.unwrap_or(0.0),
                self.vegetation_health_percent.unwrap_or(0.0),
            )
        } else {
            DisplayColor::Unfetched
        };
        self.display_color
    }

    /// Dashboard summary, `None` until a decision has been recorded
    pub fn status(&self) -> Option<FieldStatus> {
        if !self.fetched_data {
            return None;
        }
        let vegetation = self.vegetation_health_percent?;
        let soil_moisture = self.soil_moisture_percent?;
        let needs_watering = self.irrigation_decision?;
        Some(FieldStatus::new(
            vegetation,
            soil_moisture,
            needs_watering,
            self.temperature_celsius,
            self.humidity_percent,
        ))
    }
}

/// Ten-band red to green scale plus the unfetched sentinel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayColor {
    Unfetched,
    Band0,
    Band1,
    Band2,
    Band3,
    Band4,
    Band5,
    Band6,
    Band7,
    Band8,
    Band9,
}

impl DisplayColor {
    const BANDS: [DisplayColor; 10] = [
        DisplayColor::Band0,
        DisplayColor::Band1,
        DisplayColor::Band2,
        DisplayColor::Band3,
        DisplayColor::Band4,
        DisplayColor::Band5,
        DisplayColor::Band6,
        DisplayColor::Band7,
        DisplayColor::Band8,
        DisplayColor::Band9,
    ];

    /// Band for an average in 0..100. Thresholds are strict: 9.99 is Band0
    /// and 10.0 is Band1.
    pub fn for_average(average: f64) -> Self {
        Self::BANDS
            .iter()
            .zip(1..)
            .find(|(_, upper)| average < f64::from(*upper) * 10.0)
            .map(|(band, _)| *band)
            .unwrap_or(DisplayColor::Band9)
    }

    /// Band for a fetched field: the mean of the irrigation flag (0 or 1)
    /// and the two percentages
    pub fn for_metrics(irrigate: bool, soil_moisture_percent: f64, vegetation_percent: f64) -> Self {
        let irrigate = if irrigate { 1.0 } else { 0.0 };
        Self::for_average((irrigate + soil_moisture_percent + vegetation_percent) / 3.0)
    }

    pub fn hex(&self) -> &'static str {
        match self {
            DisplayColor::Unfetched => "#0000FF",
            DisplayColor::Band0 => "#FF0000",
            DisplayColor::Band1 => "#FF3300",
            DisplayColor::Band2 => "#FF6600",
            DisplayColor::Band3 => "#FF9900",
            DisplayColor::Band4 => "#FFCC00",
            DisplayColor::Band5 => "#FFFF00",
            DisplayColor::Band6 => "#CCFF00",
            DisplayColor::Band7 => "#99FF00",
            DisplayColor::Band8 => "#66FF00",
            DisplayColor::Band9 => "#33FF00",
        }
    }
}

impl std::fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

/// Vegetation condition shown on the dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VegetationStatus {
    /// 75% and above
    Healthy,
    /// 50-74.99%
    Moderate,
    /// Below 50%
    Poor,
}

impl VegetationStatus {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 75.0 {
            VegetationStatus::Healthy
        } else if percent >= 50.0 {
            VegetationStatus::Moderate
        } else {
            VegetationStatus::Poor
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            VegetationStatus::Healthy => "healthy vegetation",
            VegetationStatus::Moderate => "moderate vegetation health",
            VegetationStatus::Poor => "poor vegetation health",
        }
    }
}

/// Soil moisture band considered ideal, in percent
pub const IDEAL_MOISTURE_MIN: f64 = 40.0;
pub const IDEAL_MOISTURE_MAX: f64 = 60.0;

/// Dashboard summary of a fetched field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldStatus {
    pub vegetation: VegetationStatus,
    pub needs_watering: bool,
    pub moisture_in_ideal_range: bool,
    pub vegetation_health: String,
    pub soil_moisture: String,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub summary: String,
}

impl FieldStatus {
    pub fn new(
        vegetation_percent: f64,
        soil_moisture_percent: f64,
        needs_watering: bool,
        temperature_celsius: Option<Decimal>,
        humidity_percent: Option<i32>,
    ) -> Self {
        let vegetation = VegetationStatus::from_percent(vegetation_percent);
        let watering = if needs_watering {
            "needs watering"
        } else {
            "adequate moisture"
        };
        let percent = |value: f64| Decimal::from_f64_retain(value).unwrap_or_default();

        Self {
            vegetation,
            needs_watering,
            moisture_in_ideal_range: (IDEAL_MOISTURE_MIN..=IDEAL_MOISTURE_MAX)
                .contains(&soil_moisture_percent),
            vegetation_health: format_metric(percent(vegetation_percent), MetricKind::VegetationHealth),
            soil_moisture: format_metric(percent(soil_moisture_percent), MetricKind::SoilMoisture),
            temperature: temperature_celsius.map(|t| format_metric(t, MetricKind::Temperature)),
            humidity: humidity_percent.map(|h| format_metric(Decimal::from(h), MetricKind::Humidity)),
            summary: format!("Field shows {} with {}.", vegetation.phrase(), watering),
        }
    }
}
