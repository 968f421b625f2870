//! Remote-sensing indices and their categorical buckets

use serde::{Deserialize, Serialize};

/// Index values for a field's bounding area, as returned by the imagery provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawIndices {
    /// Normalized difference moisture stress, -1 to 1
    pub moisture_stress: f64,
    /// Enhanced vegetation index, practically 0 to 1
    pub evi: f64,
    /// Normalized difference vegetation index, -1 to 1
    pub ndvi: f64,
    /// Most of the scene was cloud-covered. Informational only.
    pub cloudy: bool,
}

/// Named indices requested from the imagery provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IndexName {
    #[serde(rename = "Moisture Stress")]
    MoistureStress,
    #[serde(rename = "EVI Index")]
    Evi,
    #[serde(rename = "NDVI Index")]
    Ndvi,
}

impl IndexName {
    pub const ALL: [IndexName; 3] = [IndexName::MoistureStress, IndexName::Evi, IndexName::Ndvi];

    pub fn label(&self) -> &'static str {
        match self {
            IndexName::MoistureStress => "Moisture Stress",
            IndexName::Evi => "EVI Index",
            IndexName::Ndvi => "NDVI Index",
        }
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Moisture stress bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MoistureLevel {
    Dry,
    Low,
    Moderate,
    High,
}

impl MoistureLevel {
    pub const ALL: [MoistureLevel; 4] = [
        MoistureLevel::Dry,
        MoistureLevel::Low,
        MoistureLevel::Moderate,
        MoistureLevel::High,
    ];

    /// Category label as it appears in the training data
    pub fn label(&self) -> &'static str {
        match self {
            MoistureLevel::Dry => "Dry",
            MoistureLevel::Low => "Low",
            MoistureLevel::Moderate => "Moderate",
            MoistureLevel::High => "High",
        }
    }
}

impl std::fmt::Display for MoistureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Vegetation health bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VegetationHealth {
    Healthy,
    #[serde(rename = "Not Healthy")]
    NotHealthy,
}

impl VegetationHealth {
    pub const ALL: [VegetationHealth; 2] = [VegetationHealth::Healthy, VegetationHealth::NotHealthy];

    pub fn label(&self) -> &'static str {
        match self {
            VegetationHealth::Healthy => "Healthy",
            VegetationHealth::NotHealthy => "Not Healthy",
        }
    }
}

impl std::fmt::Display for VegetationHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket a moisture stress value. Each boundary belongs to the lower bucket:
/// 0 is Dry, 0.2 is Low, 0.4 is Moderate. NaN falls through to Dry.
pub fn classify_moisture_stress(value: f64) -> MoistureLevel {
    if value > 0.4 {
        MoistureLevel::High
    } else if value > 0.2 {
        MoistureLevel::Moderate
    } else if value > 0.0 {
        MoistureLevel::Low
    } else {
        MoistureLevel::Dry
    }
}

/// Vegetation is healthy when EVI is strictly above 0.2
pub fn classify_vegetation_health(evi: f64) -> VegetationHealth {
    if evi > 0.2 {
        VegetationHealth::Healthy
    } else {
        VegetationHealth::NotHealthy
    }
}

/// Vegetation is present when NDVI is strictly above 0.2
pub fn classify_vegetation_presence(ndvi: f64) -> bool {
    ndvi > 0.2
}

/// Scale moisture stress (-1..1) to a 0..100 soil moisture percentage
pub fn soil_moisture_percent(moisture_stress: f64) -> f64 {
    (moisture_stress + 1.0) * 50.0
}

/// Scale EVI (0..1) to a 0..100 vegetation health percentage
pub fn vegetation_health_percent(evi: f64) -> f64 {
    evi * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moisture_boundaries() {
        assert_eq!(classify_moisture_stress(-1.0), MoistureLevel::Dry);
        assert_eq!(classify_moisture_stress(0.0), MoistureLevel::Dry);
        assert_eq!(classify_moisture_stress(0.0001), MoistureLevel::Low);
        assert_eq!(classify_moisture_stress(0.2), MoistureLevel::Low);
        assert_eq!(classify_moisture_stress(0.2001), MoistureLevel::Moderate);
        assert_eq!(classify_moisture_stress(0.4), MoistureLevel::Moderate);
        assert_eq!(classify_moisture_stress(0.4001), MoistureLevel::High);
        assert_eq!(classify_moisture_stress(1.0), MoistureLevel::High);
    }

    #[test]
    fn test_moisture_nan_is_dry() {
        assert_eq!(classify_moisture_stress(f64::NAN), MoistureLevel::Dry);
    }

    #[test]
    fn test_vegetation_health_boundary() {
        assert_eq!(classify_vegetation_health(0.2), VegetationHealth::NotHealthy);
        assert_eq!(classify_vegetation_health(0.2001), VegetationHealth::Healthy);
        assert_eq!(classify_vegetation_health(-0.5), VegetationHealth::NotHealthy);
    }

    #[test]
    fn test_vegetation_presence_boundary() {
        assert!(!classify_vegetation_presence(0.2));
        assert!(classify_vegetation_presence(0.25));
    }

    #[test]
    fn test_percent_scaling() {
        assert_eq!(soil_moisture_percent(-1.0), 0.0);
        assert_eq!(soil_moisture_percent(0.0), 50.0);
        assert_eq!(soil_moisture_percent(1.0), 100.0);
        assert!((vegetation_health_percent(0.3) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_serialize_as_training_categories() {
        assert_eq!(serde_json::to_string(&VegetationHealth::NotHealthy).unwrap(), "\"Not Healthy\"");
        assert_eq!(serde_json::to_string(&IndexName::Evi).unwrap(), "\"EVI Index\"");
        assert_eq!(MoistureLevel::Moderate.to_string(), "Moderate");
    }
}
