//! Common types used across the platform

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A WGS84 position, longitude first (GeoJSON order)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Both components are finite and within the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((longitude, latitude): (f64, f64)) -> Self {
        Self::new(longitude, latitude)
    }
}

/// Axis-aligned bounding box in WGS84 degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`, the order imagery APIs expect
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Inclusive date range used for imagery queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The window of `days` days ending on `today`
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today - Duration::days(i64::from(days)),
            end: today,
        }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Kinds of metrics shown on the field dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    VegetationHealth,
    SoilMoisture,
    Humidity,
    Temperature,
}

/// Format a dashboard metric with its unit
pub fn format_metric(value: Decimal, kind: MetricKind) -> String {
    let value = value.round_dp(1).normalize();
    match kind {
        MetricKind::VegetationHealth | MetricKind::SoilMoisture | MetricKind::Humidity => {
            format!("{}%", value)
        }
        MetricKind::Temperature => format!("{}°C", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(16.25, 52.65).is_valid());
        assert!(Coordinate::new(-180.0, -90.0).is_valid());
        assert!(!Coordinate::new(181.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 90.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_last_days_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = TimeInterval::last_days(today, 10);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(window.end, today);
        assert_eq!(window.days(), 10);
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Decimal::from(45), MetricKind::SoilMoisture), "45%");
        assert_eq!(format_metric(Decimal::from_str("24.06").unwrap(), MetricKind::Temperature), "24.1°C");
        assert_eq!(format_metric(Decimal::from_str("65.0").unwrap(), MetricKind::Humidity), "65%");
    }
}
