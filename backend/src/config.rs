//! Configuration management for the MapStronaut backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MAPSTRONAUT_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::RainThresholds;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Satellite imagery configuration
    pub imagery: ImageryConfig,

    /// Irrigation classifier configuration
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,

    /// Rain in the last hour above this counts as rain (mm)
    pub current_rain_threshold_mm: Decimal,

    /// Summed forecast rain above this counts as rain (mm)
    pub forecast_rain_threshold_mm: Decimal,

    /// How far ahead forecast rain is summed
    pub forecast_horizon_days: i64,

    pub request_timeout_secs: u64,
}

impl WeatherConfig {
    pub fn rain_thresholds(&self) -> RainThresholds {
        RainThresholds {
            current_mm: self.current_rain_threshold_mm,
            forecast_mm: self.forecast_rain_threshold_mm,
            horizon_days: self.forecast_horizon_days,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageryConfig {
    /// OAuth2 token endpoint
    pub auth_url: String,

    /// Sentinel Hub API base URL
    pub api_endpoint: String,

    /// OAuth2 client credentials
    pub client_id: String,
    pub client_secret: String,

    /// Pixel size in metres
    pub resolution_m: u32,

    /// Number of days of imagery aggregated per request
    pub window_days: u32,

    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Path to the exported decision tree (JSON)
    pub model_path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MAPSTRONAUT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.current_rain_threshold_mm", "5")?
            .set_default("weather.forecast_rain_threshold_mm", "10")?
            .set_default("weather.forecast_horizon_days", 3)?
            .set_default("weather.request_timeout_secs", 30)?
            .set_default(
                "imagery.auth_url",
                "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token",
            )?
            .set_default("imagery.api_endpoint", "https://services.sentinel-hub.com")?
            .set_default("imagery.client_id", "")?
            .set_default("imagery.client_secret", "")?
            .set_default("imagery.resolution_m", 10)?
            .set_default("imagery.window_days", 10)?
            .set_default("imagery.request_timeout_secs", 60)?
            .set_default("classifier.model_path", "model/irrigation_model.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MAPSTRONAUT_ prefix)
            .add_source(
                Environment::with_prefix("MAPSTRONAUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
