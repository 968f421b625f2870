//! Validation utilities for MapStronaut
//!
//! Checks applied to data coming from the imagery provider, the weather
//! provider and the chat assistant before it is used.

use rust_decimal::Decimal;

use crate::models::RawIndices;

// ============================================================================
// Remote Sensing Validations
// ============================================================================

/// Validate a normalized-difference index value (-1 to 1)
pub fn validate_normalized_index(value: f64) -> Result<(), &'static str> {
    if value.is_nan() {
        return Err("Index value is missing (no valid pixels)");
    }
    if !(-1.0..=1.0).contains(&value) {
        return Err("Normalized index must be between -1 and 1");
    }
    Ok(())
}

/// Validate EVI. It is not bounded by construction, so only finiteness is
/// required.
pub fn validate_evi(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("EVI value is missing (no valid pixels)");
    }
    Ok(())
}

/// Validate all indices of one imagery response
pub fn validate_indices(indices: &RawIndices) -> Result<(), &'static str> {
    validate_normalized_index(indices.moisture_stress)?;
    validate_evi(indices.evi)?;
    validate_normalized_index(indices.ndvi)?;
    Ok(())
}

// ============================================================================
// Weather Validations
// ============================================================================

/// Validate a precipitation amount in millimetres
pub fn validate_precipitation(mm: Decimal) -> Result<(), &'static str> {
    if mm < Decimal::ZERO {
        return Err("Precipitation cannot be negative");
    }
    Ok(())
}

/// Validate relative humidity percentage
pub fn validate_humidity(percent: i32) -> Result<(), &'static str> {
    if !(0..=100).contains(&percent) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

// ============================================================================
// Assistant Validations
// ============================================================================

/// Validate a location handed to the map by the assistant
pub fn validate_location(location: &str) -> Result<(), &'static str> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err("Location cannot be empty");
    }
    if trimmed.len() > 200 {
        return Err("Location must be at most 200 characters");
    }
    Ok(())
}
