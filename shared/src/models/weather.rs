//! Weather data models and rain assessment

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Weather at a field's centroid, reduced to what irrigation needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    pub rain_presence: bool,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    /// Rain in the last hour
    pub current_rain_mm: Decimal,
    /// Rain summed over the forecast horizon
    pub forecast_rain_mm: Decimal,
}

/// Precipitation of one forecast step (OpenWeatherMap steps are 3 hours)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPrecipitation {
    pub timestamp: DateTime<Utc>,
    pub rain_3h_mm: Option<Decimal>,
}

/// Limits above which rain counts as present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RainThresholds {
    /// Strict limit on the last hour's rain
    pub current_mm: Decimal,
    /// Strict limit on the summed forecast rain
    pub forecast_mm: Decimal,
    /// Forecast steps further out than this are ignored
    pub horizon_days: i64,
}

impl Default for RainThresholds {
    fn default() -> Self {
        Self {
            current_mm: Decimal::from(5),
            forecast_mm: Decimal::from(10),
            horizon_days: 3,
        }
    }
}

/// Outcome of a rain assessment with the amounts that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RainAssessment {
    pub rain_presence: bool,
    pub current_rain_mm: Decimal,
    pub forecast_rain_mm: Decimal,
}

/// Rain is present when the last hour exceeded the current limit or the
/// forecast up to `now + horizon` exceeds the forecast limit
pub fn assess_rain(
    current_rain_1h_mm: Option<Decimal>,
    forecast: &[ForecastPrecipitation],
    now: DateTime<Utc>,
    thresholds: &RainThresholds,
) -> RainAssessment {
    let current_rain_mm = current_rain_1h_mm.unwrap_or(Decimal::ZERO);
    let horizon = now + Duration::days(thresholds.horizon_days);

    let forecast_rain_mm: Decimal = forecast
        .iter()
        .filter(|step| step.timestamp <= horizon)
        .filter_map(|step| step.rain_3h_mm)
        .sum();

    RainAssessment {
        rain_presence: current_rain_mm > thresholds.current_mm
            || forecast_rain_mm > thresholds.forecast_mm,
        current_rain_mm,
        forecast_rain_mm,
    }
}
