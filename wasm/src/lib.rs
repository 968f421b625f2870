//! WebAssembly module for MapStronaut
//!
//! Provides client-side computation for:
//! - Polygon area, centroid and marker position while the user draws
//! - Index bucketing and field colors
//! - Dashboard metric formatting
//! - Parsing chat assistant replies

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::geometry::*;
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

/// Parse a GeoJSON ring (`[[lon, lat], ...]`) into a polygon
fn parse_ring(ring_json: &str) -> Result<Polygon, String> {
    let points: Vec<[f64; 2]> =
        serde_json::from_str(ring_json).map_err(|e| format!("Invalid ring JSON: {}", e))?;
    Polygon::from_lon_lat(&points).map_err(|e| e.to_string())
}

fn ring_centroid(ring_json: &str) -> Result<Vec<f64>, String> {
    let centroid = parse_ring(ring_json)?
        .centroid()
        .map_err(|e| e.to_string())?;
    Ok(vec![centroid.longitude, centroid.latitude])
}

fn ring_marker(ring_json: &str) -> Result<Vec<f64>, String> {
    let marker = parse_ring(ring_json)?.vertex_mean();
    Ok(vec![marker.longitude, marker.latitude])
}

fn metric_kind(kind: &str) -> Result<MetricKind, String> {
    match kind {
        "vegetation_health" => Ok(MetricKind::VegetationHealth),
        "soil_moisture" => Ok(MetricKind::SoilMoisture),
        "humidity" => Ok(MetricKind::Humidity),
        "temperature" => Ok(MetricKind::Temperature),
        other => Err(format!("Unknown metric kind: {}", other)),
    }
}

fn format_metric_str(value: f64, kind: &str) -> Result<String, String> {
    let kind = metric_kind(kind)?;
    let value = Decimal::from_f64_retain(value).ok_or_else(|| format!("Invalid value: {}", value))?;
    Ok(format_metric(value, kind))
}

/// Shoelace area of a drawn ring, in square degrees
#[wasm_bindgen]
pub fn polygon_area(ring_json: &str) -> Result<f64, JsValue> {
    parse_ring(ring_json).map(|p| p.area()).map_err(js_error)
}

/// Area-weighted centroid as `[lon, lat]`
#[wasm_bindgen]
pub fn polygon_centroid(ring_json: &str) -> Result<Vec<f64>, JsValue> {
    ring_centroid(ring_json).map_err(js_error)
}

/// Where to pin a field's marker: the mean of its vertices, as `[lon, lat]`
#[wasm_bindgen]
pub fn polygon_marker(ring_json: &str) -> Result<Vec<f64>, JsValue> {
    ring_marker(ring_json).map_err(js_error)
}

/// Moisture bucket label ("Dry", "Low", "Moderate", "High")
#[wasm_bindgen]
pub fn classify_moisture(moisture_stress: f64) -> String {
    classify_moisture_stress(moisture_stress).to_string()
}

/// Vegetation health label ("Healthy", "Not Healthy")
#[wasm_bindgen]
pub fn classify_vegetation(evi: f64) -> String {
    classify_vegetation_health(evi).to_string()
}

/// Hex color of a field on the map
#[wasm_bindgen]
pub fn display_color(
    fetched: bool,
    irrigate: bool,
    soil_moisture_percent: f64,
    vegetation_health_percent: f64,
) -> String {
    let color = if fetched {
        DisplayColor::for_metrics(irrigate, soil_moisture_percent, vegetation_health_percent)
    } else {
        DisplayColor::Unfetched
    };
    color.hex().to_string()
}

/// Format a dashboard metric; `kind` is one of vegetation_health,
/// soil_moisture, humidity, temperature
#[wasm_bindgen]
pub fn format_metric_value(value: f64, kind: &str) -> Result<String, JsValue> {
    format_metric_str(value, kind).map_err(js_error)
}

/// Parse an assistant reply into JSON: `{"kind": "message", "text": ...}` or
/// `{"kind": "callback", "callback": {"function": ..., ...}}`
#[wasm_bindgen]
pub fn parse_assistant_reply(text: &str) -> String {
    let reply = AssistantReply::parse(text);
    serde_json::to_string(&reply).unwrap_or_else(|_| "{\"kind\":\"message\"}".to_string())
}
