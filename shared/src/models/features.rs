//! Classifier feature rows and one-hot alignment
//!
//! The irrigation classifier was trained on a table with two boolean columns
//! and two categorical columns expanded into dummy columns named
//! `<column>_<category>`. A model only lists the dummy columns it kept, so a
//! sample is encoded against the model's own ordered column list. Known
//! columns the sample does not activate are 0; anything outside the schema
//! vocabulary is rejected instead of being silently zero-filled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::indices::{
    classify_moisture_stress, classify_vegetation_health, classify_vegetation_presence,
    MoistureLevel, RawIndices, VegetationHealth,
};

/// Feature columns cannot be aligned with the classifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("classifier declares no feature columns")]
    EmptySchema,

    #[error("unknown feature column '{column}' for schema {schema}")]
    UnknownColumn { column: String, schema: FeatureSchema },

    #[error("feature column '{0}' is declared more than once")]
    DuplicateColumn(String),

    #[error("expected {expected} feature values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// One sample for the irrigation classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureRow {
    pub is_vegetation: bool,
    pub vegetation_health: VegetationHealth,
    pub moisture_index: MoistureLevel,
    pub rain_presence: bool,
}

impl FeatureRow {
    /// Bucket raw indices into a feature row
    pub fn from_indices(indices: &RawIndices, rain_presence: bool) -> Self {
        Self {
            is_vegetation: classify_vegetation_presence(indices.ndvi),
            vegetation_health: classify_vegetation_health(indices.evi),
            moisture_index: classify_moisture_stress(indices.moisture_stress),
            rain_presence,
        }
    }
}

/// Versioned column vocabulary of the training table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSchema {
    #[default]
    V1,
}

const IS_VEGETATION: &str = "is_vegetation";
const RAIN_PRESENCE: &str = "rain_presence";
const VEGETATION_HEALTH_PREFIX: &str = "vegetation_health_";
const MOISTURE_INDEX_PREFIX: &str = "moisture_index_";

impl FeatureSchema {
    /// Every column name this schema can produce
    pub fn vocabulary(&self) -> Vec<String> {
        match self {
            FeatureSchema::V1 => {
                let mut columns = vec![IS_VEGETATION.to_string(), RAIN_PRESENCE.to_string()];
                columns.extend(
                    VegetationHealth::ALL
                        .iter()
                        .map(|h| format!("{}{}", VEGETATION_HEALTH_PREFIX, h.label())),
                );
                columns.extend(
                    MoistureLevel::ALL
                        .iter()
                        .map(|m| format!("{}{}", MOISTURE_INDEX_PREFIX, m.label())),
                );
                columns
            }
        }
    }

    /// Columns of a model trained with the first category of each
    /// categorical column dropped
    pub fn drop_first_columns(&self) -> Vec<String> {
        match self {
            FeatureSchema::V1 => vec![
                IS_VEGETATION.to_string(),
                RAIN_PRESENCE.to_string(),
                format!("{}{}", VEGETATION_HEALTH_PREFIX, VegetationHealth::NotHealthy.label()),
                format!("{}{}", MOISTURE_INDEX_PREFIX, MoistureLevel::High.label()),
                format!("{}{}", MOISTURE_INDEX_PREFIX, MoistureLevel::Low.label()),
                format!("{}{}", MOISTURE_INDEX_PREFIX, MoistureLevel::Moderate.label()),
            ],
        }
    }

    /// Value of a single column for a row, `None` if the column is not part
    /// of this schema
    pub fn value_of(&self, row: &FeatureRow, column: &str) -> Option<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            FeatureSchema::V1 => {
                if column == IS_VEGETATION {
                    return Some(flag(row.is_vegetation));
                }
                if column == RAIN_PRESENCE {
                    return Some(flag(row.rain_presence));
                }
                if let Some(category) = column.strip_prefix(VEGETATION_HEALTH_PREFIX) {
                    return VegetationHealth::ALL
                        .iter()
                        .find(|h| h.label() == category)
                        .map(|h| flag(*h == row.vegetation_health));
                }
                if let Some(category) = column.strip_prefix(MOISTURE_INDEX_PREFIX) {
                    return MoistureLevel::ALL
                        .iter()
                        .find(|m| m.label() == category)
                        .map(|m| flag(*m == row.moisture_index));
                }
                None
            }
        }
    }

    /// Encode a row in the order of `columns`
    pub fn encode(&self, row: &FeatureRow, columns: &[String]) -> Result<Vec<f64>, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut values = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
            let value = self
                .value_of(row, column)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    column: column.clone(),
                    schema: *self,
                })?;
            values.push(value);
        }
        Ok(values)
    }
}

impl std::fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSchema::V1 => write!(f, "v1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow {
            is_vegetation: true,
            vegetation_health: VegetationHealth::Healthy,
            moisture_index: MoistureLevel::Low,
            rain_presence: false,
        }
    }

    #[test]
    fn test_from_indices() {
        let indices = RawIndices {
            moisture_stress: 0.1,
            evi: 0.3,
            ndvi: 0.25,
            cloudy: false,
        };
        assert_eq!(FeatureRow::from_indices(&indices, false), row());
    }

    #[test]
    fn test_encode_drop_first_columns() {
        let schema = FeatureSchema::V1;
        let columns = schema.drop_first_columns();
        let encoded = schema.encode(&row(), &columns).unwrap();
        assert_eq!(encoded, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_dropped_category_encodes_as_all_zero() {
        let schema = FeatureSchema::V1;
        let dry = FeatureRow {
            moisture_index: MoistureLevel::Dry,
            ..row()
        };
        let encoded = schema.encode(&dry, &schema.drop_first_columns()).unwrap();
        assert_eq!(&encoded[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_encode_follows_model_order() {
        let schema = FeatureSchema::V1;
        let columns = vec![
            "moisture_index_Low".to_string(),
            "rain_presence".to_string(),
            "vegetation_health_Healthy".to_string(),
        ];
        assert_eq!(schema.encode(&row(), &columns).unwrap(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_column_is_schema_mismatch() {
        let schema = FeatureSchema::V1;
        let columns = vec!["is_vegetation".to_string(), "soil_type_Clay".to_string()];
        let err = schema.encode(&row(), &columns).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownColumn {
                column: "soil_type_Clay".to_string(),
                schema: FeatureSchema::V1
            }
        );
    }

    #[test]
    fn test_unknown_category_is_schema_mismatch() {
        let schema = FeatureSchema::V1;
        let columns = vec!["moisture_index_Soaked".to_string()];
        assert!(matches!(
            schema.encode(&row(), &columns),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_empty_columns() {
        let schema = FeatureSchema::V1;
        assert_eq!(schema.encode(&row(), &[]).unwrap_err(), SchemaError::EmptySchema);
        let columns = vec!["rain_presence".to_string(), "rain_presence".to_string()];
        assert_eq!(
            schema.encode(&row(), &columns).unwrap_err(),
            SchemaError::DuplicateColumn("rain_presence".to_string())
        );
    }

    #[test]
    fn test_vocabulary_covers_drop_first_columns() {
        let schema = FeatureSchema::V1;
        let vocabulary = schema.vocabulary();
        assert_eq!(vocabulary.len(), 8);
        for column in schema.drop_first_columns() {
            assert!(vocabulary.contains(&column));
        }
    }
}
