//! Sentinel Hub client for satellite index statistics and previews
//!
//! Index values come from the Statistical API: one evalscript per index, cloudy
//! pixels masked out, averaged over the bounding box and the time window.
//! Every call authenticates with OAuth2 client credentials first.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{validate_indices, BoundingBox, IndexName, RawIndices, TimeInterval};

use super::ImageryProvider;
use crate::config::ImageryConfig;
use crate::error::{AppError, AppResult};

const PROVIDER: &str = "imagery";

/// Sentinel Hub caps request dimensions at 2500 px
const MAX_DIMENSION_PX: u32 = 2500;

/// Share of masked NDVI pixels above which the window counts as cloudy
const CLOUDY_MASKED_FRACTION: f64 = 0.5;

const DATA_COLLECTION: &str = "sentinel-2-l2a";

/// Normalized difference moisture index, B08 against B11
const MOISTURE_STRESS_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B03", "B04", "B08", "B11", "dataMask"],
    output: [
      { id: "index", bands: 1, sampleType: "FLOAT32" },
      { id: "dataMask", bands: 1 }
    ]
  };
}

function evaluatePixel(samples) {
  let val = (samples.B08 - samples.B11) / (samples.B08 + samples.B11);
  return {
    index: [val],
    dataMask: [samples.dataMask === 1 && !isCloud(samples) ? 1 : 0]
  };
}

function isCloud(samples) {
  const ngdr = index(samples.B03, samples.B04);
  const bRatio = (samples.B03 - 0.175) / (0.39 - 0.175);
  return bRatio > 1 || (bRatio > 0 && ngdr > 0);
}
"#;

const EVI_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B02", "B03", "B04", "B08", "dataMask"],
    output: [
      { id: "index", bands: 1, sampleType: "FLOAT32" },
      { id: "dataMask", bands: 1 }
    ]
  };
}

function evaluatePixel(samples) {
  let evi = (2.5 * (samples.B08 - samples.B04)) /
    (samples.B08 + 6.0 * samples.B04 - 7.5 * samples.B02 + 1.0);
  return {
    index: [evi],
    dataMask: [samples.dataMask === 1 && !isCloud(samples) ? 1 : 0]
  };
}

function isCloud(samples) {
  const ngdr = index(samples.B03, samples.B04);
  const bRatio = (samples.B03 - 0.175) / (0.39 - 0.175);
  return bRatio > 1 || (bRatio > 0 && ngdr > 0);
}
"#;

/// NDVI; clouds come from the scene classification layer
const NDVI_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B04", "B08", "SCL", "dataMask"],
    output: [
      { id: "index", bands: 1, sampleType: "FLOAT32" },
      { id: "dataMask", bands: 1 }
    ]
  };
}

function evaluatePixel(samples) {
  let val = index(samples.B08, samples.B04);
  return {
    index: [val],
    dataMask: [samples.dataMask === 1 && !isCloud(samples.SCL) ? 1 : 0]
  };
}

function isCloud(scl) {
  // 8: medium probability, 9: high probability, 10: thin cirrus
  return scl == 8 || scl == 9 || scl == 10;
}
"#;

const TRUE_COLOR_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: ["B02", "B03", "B04"],
    output: { bands: 3 }
  };
}

function evaluatePixel(sample) {
  return [2.5 * sample.B04, 2.5 * sample.B03, 2.5 * sample.B02];
}
"#;

fn evalscript(index: IndexName) -> &'static str {
    match index {
        IndexName::MoistureStress => MOISTURE_STRESS_EVALSCRIPT,
        IndexName::Evi => EVI_EVALSCRIPT,
        IndexName::Ndvi => NDVI_EVALSCRIPT,
    }
}

/// Sentinel Hub API client
#[derive(Clone)]
pub struct ImageryClient {
    http_client: Client,
    auth_url: String,
    api_endpoint: String,
    client_id: String,
    client_secret: String,
    resolution_m: u32,
}

/// True-color preview of a field's bounding box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImagePreview {
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub data_base64: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Statistical API response
#[derive(Debug, Deserialize)]
struct StatisticsResponse {
    data: Vec<StatisticsInterval>,
}

#[derive(Debug, Deserialize)]
struct StatisticsInterval {
    outputs: std::collections::HashMap<String, StatisticsOutput>,
}

#[derive(Debug, Deserialize)]
struct StatisticsOutput {
    bands: std::collections::HashMap<String, BandStatistics>,
}

#[derive(Debug, Deserialize)]
struct BandStatistics {
    stats: Stats,
}

/// `mean` is the string "NaN" when every pixel was masked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    mean: Value,
    sample_count: u64,
    no_data_count: u64,
}

/// Mean of one index over all intervals, and the share of masked pixels
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexStatistics {
    mean: f64,
    masked_fraction: f64,
}

impl ImageryClient {
    /// Create a new imagery client from configuration
    pub fn new(config: &ImageryConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Imagery HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            auth_url: config.auth_url.clone(),
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            resolution_m: config.resolution_m,
        })
    }

    /// Obtain an access token with the client credentials grant
    async fn access_token(&self) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::data_fetch(
                PROVIDER,
                format!("Token endpoint returned {}: {}", status, body),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Failed to parse token: {}", e)))?;
        Ok(token.access_token)
    }

    async fn index_statistics(
        &self,
        token: &str,
        index: IndexName,
        bbox: &BoundingBox,
        window: &TimeInterval,
    ) -> AppResult<IndexStatistics> {
        let (width, height) = pixel_dimensions(bbox, self.resolution_m);
        let body = statistics_request(evalscript(index), bbox, window, width, height);
        tracing::debug!(%index, width, height, "Requesting index statistics");

        let response = self
            .http_client
            .post(format!("{}/api/v1/statistics", self.api_endpoint))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("{} request failed: {}", index, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::data_fetch(
                PROVIDER,
                format!("{} statistics returned {}: {}", index, status, body),
            ));
        }

        let statistics: StatisticsResponse = response.json().await.map_err(|e| {
            AppError::data_fetch(PROVIDER, format!("Failed to parse {} statistics: {}", index, e))
        })?;
        summarize(&statistics).ok_or_else(|| {
            AppError::data_fetch(PROVIDER, format!("{} statistics contain no data", index))
        })
    }

    /// Fetch a true-color PNG of the bounding box
    pub async fn true_color_preview(
        &self,
        bbox: &BoundingBox,
        window: &TimeInterval,
    ) -> AppResult<ImagePreview> {
        let token = self.access_token().await?;
        let (width, height) = pixel_dimensions(bbox, self.resolution_m);
        let body = json!({
            "input": {
                "bounds": bounds(bbox),
                "data": [{
                    "type": DATA_COLLECTION,
                    "dataFilter": {
                        "timeRange": time_range(window),
                        "mosaickingOrder": "leastCC"
                    }
                }]
            },
            "output": {
                "width": width,
                "height": height,
                "responses": [{ "identifier": "default", "format": { "type": "image/png" } }]
            },
            "evalscript": TRUE_COLOR_EVALSCRIPT
        });

        let response = self
            .http_client
            .post(format!("{}/api/v1/process", self.api_endpoint))
            .bearer_auth(&token)
            .header("Accept", "image/png")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Preview request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::data_fetch(
                PROVIDER,
                format!("Process API returned {}: {}", status, body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Failed to read preview: {}", e)))?;

        Ok(ImagePreview {
            content_type: "image/png".to_string(),
            width,
            height,
            data_base64: STANDARD.encode(&bytes),
        })
    }
}

impl ImageryProvider for ImageryClient {
    async fn fetch_indices(&self, bbox: BoundingBox, window: TimeInterval) -> AppResult<RawIndices> {
        let token = self.access_token().await?;

        let moisture = self
            .index_statistics(&token, IndexName::MoistureStress, &bbox, &window)
            .await?;
        let evi = self.index_statistics(&token, IndexName::Evi, &bbox, &window).await?;
        let ndvi = self.index_statistics(&token, IndexName::Ndvi, &bbox, &window).await?;

        let indices = raw_indices(&moisture, &evi, &ndvi);
        validate_indices(&indices).map_err(|e| AppError::data_fetch(PROVIDER, e))?;
        Ok(indices)
    }

    async fn fetch_preview(&self, bbox: BoundingBox, window: TimeInterval) -> AppResult<ImagePreview> {
        self.true_color_preview(&bbox, &window).await
    }
}

fn raw_indices(
    moisture: &IndexStatistics,
    evi: &IndexStatistics,
    ndvi: &IndexStatistics,
) -> RawIndices {
    RawIndices {
        moisture_stress: moisture.mean,
        evi: evi.mean,
        ndvi: ndvi.mean,
        cloudy: ndvi.masked_fraction > CLOUDY_MASKED_FRACTION,
    }
}

/// Image size in pixels for the bounding box at `resolution_m` metres per pixel
pub fn pixel_dimensions(bbox: &BoundingBox, resolution_m: u32) -> (u32, u32) {
    const METRES_PER_DEGREE_LAT: f64 = 110_574.0;
    const METRES_PER_DEGREE_LON_EQUATOR: f64 = 111_320.0;

    let mid_lat = ((bbox.min_lat + bbox.max_lat) / 2.0).to_radians();
    let width_m = bbox.width() * METRES_PER_DEGREE_LON_EQUATOR * mid_lat.cos();
    let height_m = bbox.height() * METRES_PER_DEGREE_LAT;
    let resolution = f64::from(resolution_m.max(1));

    let to_pixels = |metres: f64| (metres / resolution).round().clamp(1.0, f64::from(MAX_DIMENSION_PX)) as u32;
    (to_pixels(width_m), to_pixels(height_m))
}

fn bounds(bbox: &BoundingBox) -> Value {
    json!({
        "bbox": bbox.to_array(),
        "properties": { "crs": "http://www.opengis.net/def/crs/OGC/1.3/CRS84" }
    })
}

fn time_range(window: &TimeInterval) -> Value {
    json!({
        "from": format!("{}T00:00:00Z", window.start),
        "to": format!("{}T23:59:59Z", window.end)
    })
}

fn statistics_request(
    evalscript: &str,
    bbox: &BoundingBox,
    window: &TimeInterval,
    width: u32,
    height: u32,
) -> Value {
    json!({
        "input": {
            "bounds": bounds(bbox),
            "data": [{ "type": DATA_COLLECTION }]
        },
        "aggregation": {
            "timeRange": time_range(window),
            "aggregationInterval": {
                "of": format!("P{}D", window.days().max(1)),
                "lastIntervalBehavior": "EXTEND"
            },
            "width": width,
            "height": height,
            "evalscript": evalscript
        }
    })
}

/// Pixel-weighted mean of the `index` output over all intervals
fn summarize(response: &StatisticsResponse) -> Option<IndexStatistics> {
    let mut weighted_sum = 0.0;
    let mut valid = 0u64;
    let mut total = 0u64;

    for interval in &response.data {
        let Some(band) = interval.outputs.get("index").and_then(|o| o.bands.get("B0")) else {
            continue;
        };
        let stats = &band.stats;
        total += stats.sample_count;
        let count = stats.sample_count.saturating_sub(stats.no_data_count);
        if let Some(mean) = stats.mean.as_f64().filter(|m| m.is_finite()) {
            weighted_sum += mean * count as f64;
            valid += count;
        }
    }

    if total == 0 {
        return None;
    }
    let mean = if valid == 0 {
        f64::NAN
    } else {
        weighted_sum / valid as f64
    };
    Some(IndexStatistics {
        mean,
        masked_fraction: 1.0 - valid as f64 / total as f64,
    })
}
