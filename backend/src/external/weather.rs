//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions and forecasts

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    assess_rain, validate_humidity, validate_precipitation, Coordinate, ForecastPrecipitation,
    RainThresholds, WeatherReading,
};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

const PROVIDER: &str = "weather";

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    thresholds: RainThresholds,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_1h_mm: Option<Decimal>,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
    rain: Option<OWMRain>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            thresholds: config.rain_thresholds(),
        })
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            thresholds: RainThresholds::default(),
        }
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current_weather(&self, location: Coordinate) -> AppResult<CurrentWeather> {
        let body = self.get("weather", location).await?;
        let data: OWMCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::data_fetch(PROVIDER, format!("Failed to parse weather response: {}", e))
        })?;
        convert_current_response(data)
    }

    /// Fetch the 5-day / 3-hour precipitation forecast by GPS coordinates
    pub async fn get_forecast(&self, location: Coordinate) -> AppResult<Vec<ForecastPrecipitation>> {
        let body = self.get("forecast", location).await?;
        let data: OWMForecastResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::data_fetch(PROVIDER, format!("Failed to parse forecast response: {}", e))
        })?;
        convert_forecast_response(data)
    }

    async fn get(&self, resource: &str, location: Coordinate) -> AppResult<String> {
        let url = format!(
            "{}/{}?lat={}&lon={}&appid={}&units=metric",
            self.base_url, resource, location.latitude, location.longitude, self.api_key
        );
        tracing::debug!(resource, lat = location.latitude, lon = location.longitude, "Calling weather API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::data_fetch(
                PROVIDER,
                format!("API returned {}: {}", status, body),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::data_fetch(PROVIDER, format!("Failed to read response: {}", e)))
    }
}

impl WeatherProvider for WeatherClient {
    async fn fetch_weather(&self, location: Coordinate) -> AppResult<WeatherReading> {
        let current = self.get_current_weather(location).await?;
        let forecast = self.get_forecast(location).await?;
        let assessment = assess_rain(current.rain_1h_mm, &forecast, Utc::now(), &self.thresholds);

        tracing::debug!(
            current_rain_mm = %assessment.current_rain_mm,
            forecast_rain_mm = %assessment.forecast_rain_mm,
            rain_presence = assessment.rain_presence,
            "Assessed rain"
        );

        Ok(WeatherReading {
            rain_presence: assessment.rain_presence,
            temperature_celsius: current.temperature_celsius,
            humidity_percent: current.humidity_percent,
            current_rain_mm: assessment.current_rain_mm,
            forecast_rain_mm: assessment.forecast_rain_mm,
        })
    }
}

fn to_decimal(value: f64, what: &str) -> AppResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| AppError::data_fetch(PROVIDER, format!("Invalid {} value: {}", what, value)))
}

fn to_timestamp(seconds: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::data_fetch(PROVIDER, format!("Invalid timestamp: {}", seconds)))
}

fn to_rain(value: Option<f64>) -> AppResult<Option<Decimal>> {
    value
        .map(|v| {
            let mm = to_decimal(v, "precipitation")?;
            validate_precipitation(mm).map_err(|e| AppError::data_fetch(PROVIDER, e))?;
            Ok(mm)
        })
        .transpose()
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> AppResult<CurrentWeather> {
    validate_humidity(data.main.humidity).map_err(|e| AppError::data_fetch(PROVIDER, e))?;

    Ok(CurrentWeather {
        temperature_celsius: to_decimal(data.main.temp, "temperature")?,
        humidity_percent: data.main.humidity,
        rain_1h_mm: to_rain(data.rain.and_then(|r| r.one_hour))?,
    })
}

/// Convert OpenWeatherMap forecast response to our format
fn convert_forecast_response(data: OWMForecastResponse) -> AppResult<Vec<ForecastPrecipitation>> {
    data.list
        .into_iter()
        .map(|item| {
            Ok(ForecastPrecipitation {
                timestamp: to_timestamp(item.dt)?,
                rain_3h_mm: to_rain(item.rain.and_then(|r| r.three_hour))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const CURRENT: &str = r#"{
        "coord": {"lon": 16.24, "lat": 52.65},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 21.5, "feels_like": 21.0, "pressure": 1012, "humidity": 64},
        "rain": {"1h": 0.6},
        "dt": 1717243200,
        "name": "Oborniki"
    }"#;

    const FORECAST: &str = r#"{
        "list": [
            {"dt": 1717254000, "rain": {"3h": 2.5}},
            {"dt": 1717264800},
            {"dt": 1717275600, "rain": {"3h": 0.31}}
        ],
        "city": {"name": "Oborniki"}
    }"#;

    #[test]
    fn test_convert_current_response() {
        let data: OWMCurrentResponse = serde_json::from_str(CURRENT).unwrap();
        let current = convert_current_response(data).unwrap();
        assert_eq!(current.temperature_celsius, Decimal::from_str("21.5").unwrap());
        assert_eq!(current.humidity_percent, 64);
        assert_eq!(current.rain_1h_mm, Some(Decimal::from_str("0.6").unwrap()));
    }

    #[test]
    fn test_current_without_rain_block() {
        let json = r#"{"weather": [], "main": {"temp": 18.0, "humidity": 50}, "dt": 1717243200}"#;
        let data: OWMCurrentResponse = serde_json::from_str(json).unwrap();
        let current = convert_current_response(data).unwrap();
        assert_eq!(current.rain_1h_mm, None);
    }

    #[test]
    fn test_invalid_humidity_is_data_fetch_error() {
        let json = r#"{"weather": [], "main": {"temp": 18.0, "humidity": 140}, "dt": 1717243200}"#;
        let data: OWMCurrentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            convert_current_response(data),
            Err(AppError::DataFetch { .. })
        ));
    }

    #[test]
    fn test_convert_forecast_response() {
        let data: OWMForecastResponse = serde_json::from_str(FORECAST).unwrap();
        let forecast = convert_forecast_response(data).unwrap();
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0].rain_3h_mm, Some(Decimal::from_str("2.5").unwrap()));
        assert_eq!(forecast[1].rain_3h_mm, None);
        assert_eq!(forecast[2].rain_3h_mm, Some(Decimal::from_str("0.31").unwrap()));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_data_fetch_error() {
        let client = WeatherClient::with_base_url("key".to_string(), "http://127.0.0.1:9".to_string());
        let result = client.fetch_weather(Coordinate::new(16.24, 52.65)).await;
        assert!(matches!(result, Err(AppError::DataFetch { .. })));
    }
}
