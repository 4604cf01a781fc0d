//! Configuration management for `OutfitAI`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::OutfitAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `OutfitAI` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitAiConfig {
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Outfit suggestion (chat completion) API configuration
    pub suggestion: SuggestionConfig,
    /// Image classification API configuration
    pub classifier: ClassifierConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Report rendering settings
    pub display: DisplayConfig,
}

/// OpenWeatherMap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for weather API
    pub base_url: String,
    /// City to look up the current weather for
    pub city: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Skip the language model call entirely when false
    pub enabled: bool,
    pub api_key: Option<String>,
    /// Base URL of an OpenAI compatible API
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inference endpoint accepting raw image bytes
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Number of ranked predictions to keep
    pub top_k: u32,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory location
    pub location: String,
    /// How long a weather reading is reused
    pub weather_ttl_minutes: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Report layout (full or compact)
    pub layout: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_city() -> String {
    "Baku".to_string()
}

fn default_suggestion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_suggestion_model() -> String {
    "gpt-4".to_string()
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models/google/mobilenet_v2_1.0_224".to_string()
}

fn default_top_k() -> u32 {
    5
}

fn default_timeout() -> u32 {
    30
}

fn default_suggestion_timeout() -> u32 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("outfitai"))
        .unwrap_or_else(|| PathBuf::from(".outfitai-cache"))
        .to_string_lossy()
        .into_owned()
}

fn default_weather_ttl() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_layout() -> String {
    "full".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            city: default_city(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_suggestion_base_url(),
            model: default_suggestion_model(),
            timeout_seconds: default_suggestion_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_classifier_endpoint(),
            api_key: None,
            top_k: default_top_k(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_cache_location(),
            weather_ttl_minutes: default_weather_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
        }
    }
}

impl OutfitAiConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        } else if explicit {
            return Err(OutfitAiError::config(format!(
                "Config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        // Environment overrides, e.g. OUTFITAI_WEATHER__CITY
        builder = builder.add_source(
            Environment::with_prefix("OUTFITAI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: OutfitAiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.apply_env_api_keys();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("outfitai").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.city.trim().is_empty() {
            self.weather.city = default_city();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.suggestion.base_url.is_empty() {
            self.suggestion.base_url = default_suggestion_base_url();
        }
        if self.suggestion.model.is_empty() {
            self.suggestion.model = default_suggestion_model();
        }
        if self.suggestion.timeout_seconds == 0 {
            self.suggestion.timeout_seconds = default_suggestion_timeout();
        }
        if self.classifier.endpoint.is_empty() {
            self.classifier.endpoint = default_classifier_endpoint();
        }
        if self.classifier.top_k == 0 {
            self.classifier.top_k = default_top_k();
        }
        if self.classifier.timeout_seconds == 0 {
            self.classifier.timeout_seconds = default_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.weather_ttl_minutes == 0 {
            self.cache.weather_ttl_minutes = default_weather_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.display.layout.is_empty() {
            self.display.layout = default_layout();
        }
    }

    /// Fill unset API keys from the providers' conventional env vars
    pub fn apply_env_api_keys(&mut self) {
        fn from_env(slot: &mut Option<String>, var: &str) {
            if slot.is_none() {
                *slot = std::env::var(var).ok().filter(|v| !v.is_empty());
            }
        }

        from_env(&mut self.weather.api_key, "OPENWEATHER_API_KEY");
        from_env(&mut self.suggestion.api_key, "OPENAI_API_KEY");
        from_env(&mut self.classifier.api_key, "HF_API_TOKEN");
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Weather", &self.weather.api_key),
            ("Suggestion", &self.suggestion.api_key),
            ("Classifier", &self.classifier.api_key),
        ];

        for (name, key) in keys {
            if let Some(api_key) = key {
                if api_key.is_empty() {
                    return Err(OutfitAiError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if api_key.len() < 8 {
                    return Err(OutfitAiError::config(format!(
                        "{name} API key appears to be invalid (too short). Please check your API key."
                    ))
                    .into());
                }

                if api_key.len() > 256 {
                    return Err(OutfitAiError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Weather", self.weather.timeout_seconds),
            ("Suggestion", self.suggestion.timeout_seconds),
            ("Classifier", self.classifier.timeout_seconds),
        ];
        for (name, timeout) in timeouts {
            if timeout > 300 {
                return Err(OutfitAiError::config(format!(
                    "{name} API timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        let retries = [
            ("Weather", self.weather.max_retries),
            ("Suggestion", self.suggestion.max_retries),
            ("Classifier", self.classifier.max_retries),
        ];
        for (name, max_retries) in retries {
            if max_retries > 10 {
                return Err(OutfitAiError::config(format!(
                    "{name} API max retries cannot exceed 10"
                ))
                .into());
            }
        }

        if self.classifier.top_k > 100 {
            return Err(OutfitAiError::config("Classifier top_k cannot exceed 100").into());
        }

        if self.cache.weather_ttl_minutes > 24 * 60 {
            return Err(
                OutfitAiError::config("Weather cache TTL cannot exceed 1440 minutes (1 day)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(OutfitAiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(OutfitAiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_layouts = ["full", "compact"];
        if !valid_layouts.contains(&self.display.layout.as_str()) {
            return Err(OutfitAiError::config(format!(
                "Invalid display layout '{}'. Must be one of: {}",
                self.display.layout,
                valid_layouts.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Weather API base URL", &self.weather.base_url),
            ("Suggestion API base URL", &self.suggestion.base_url),
            ("Classifier endpoint", &self.classifier.endpoint),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(OutfitAiError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.weather.city.trim().is_empty() {
            return Err(OutfitAiError::config("Weather city cannot be empty").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = OutfitAiConfig::default();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.weather.city, "Baku");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.suggestion.model, "gpt-4");
        assert!(config.suggestion.enabled);
        assert_eq!(config.classifier.top_k, 5);
        assert_eq!(config.cache.weather_ttl_minutes, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.display.layout, "full");
        assert!(config.weather.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_valid_api_key() {
        let mut config = OutfitAiConfig::default();
        config.weather.api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = OutfitAiConfig::default();
        config.suggestion.api_key = Some("short".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Suggestion API key"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = OutfitAiConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_invalid_layout() {
        let mut config = OutfitAiConfig::default();
        config.display.layout = "sidebar".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid display layout"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = OutfitAiConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_url_scheme() {
        let mut config = OutfitAiConfig::default();
        config.classifier.endpoint = "ftp://models.example".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Classifier endpoint"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = OutfitAiConfig::default();
        config.weather.city = "  ".to_string();
        config.classifier.top_k = 0;
        config.suggestion.model = String::new();
        config.apply_defaults();
        assert_eq!(config.weather.city, "Baku");
        assert_eq!(config.classifier.top_k, 5);
        assert_eq!(config.suggestion.model, "gpt-4");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[weather]\ncity = \"Berlin\"\n\n[display]\nlayout = \"compact\"\n\n[suggestion]\nenabled = false"
        )
        .unwrap();

        let config = OutfitAiConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.weather.city, "Berlin");
        assert_eq!(config.display.layout, "compact");
        assert!(!config.suggestion.enabled);
        // untouched sections keep their defaults
        assert_eq!(config.classifier.top_k, 5);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = OutfitAiConfig::load_from_path(Some(PathBuf::from("/nonexistent/outfitai.toml")));
        assert!(result.unwrap_err().to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = OutfitAiConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("outfitai"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
