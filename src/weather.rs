//! Current weather lookup
//!
//! [`OpenWeatherMapClient`] talks to the OpenWeatherMap current weather API;
//! [`CachedWeatherProvider`] wraps any provider and reuses readings for a
//! while so repeated runs do not hit the API every time.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngExt;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::cache::{PersistentCache, TypedCache};
use crate::config::WeatherConfig;
use crate::http;
use crate::models::{Temperature, WeatherReading};
use crate::OutfitAiError;

const SERVICE: &str = "OpenWeatherMap";

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather for a city name
    async fn current(&self, location: &str) -> Result<WeatherReading>;
}

pub struct OpenWeatherMapClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl OpenWeatherMapClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            OutfitAiError::config(
                "Weather API key is required. Set weather.api_key or OPENWEATHER_API_KEY",
            )
        })?;

        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn current(&self, location: &str) -> Result<WeatherReading> {
        let location = location.trim();
        if location.is_empty() {
            return Err(OutfitAiError::validation("Location cannot be empty").into());
        }

        info!("Fetching current weather for {}", location);
        let url = format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(location),
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http::request_failed(SERVICE, e))?;
        let response = http::ensure_success(SERVICE, response).await?;
        let current: openweathermap::CurrentWeatherResponse =
            http::parse_json(SERVICE, response).await?;

        let reading = current.into_reading(location)?;
        debug!(
            "{} is {} ({})",
            reading.location,
            reading.temperature,
            reading.description.as_deref().unwrap_or("no description")
        );
        Ok(reading)
    }
}

/// Reuses readings from the persistent cache for `ttl` (±10% jitter)
pub struct CachedWeatherProvider<P> {
    inner: P,
    cache: TypedCache<WeatherReading>,
    ttl: Duration,
}

impl<P: WeatherProvider> CachedWeatherProvider<P> {
    pub fn new(inner: P, cache: PersistentCache, ttl: Duration) -> Self {
        Self {
            inner,
            cache: cache.typed("weather"),
            ttl,
        }
    }

    fn key(location: &str) -> String {
        location.trim().to_lowercase()
    }
}

#[async_trait]
impl<P: WeatherProvider> WeatherProvider for CachedWeatherProvider<P> {
    async fn current(&self, location: &str) -> Result<WeatherReading> {
        let key = Self::key(location);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!("Using cached weather for {}", location);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Weather cache lookup failed: {e:#}"),
        }

        let reading = self.inner.current(location).await?;

        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f64(jitter);
        if let Err(e) = self.cache.put(&key, reading.clone(), ttl).await {
            tracing::warn!("Failed to cache weather reading: {e:#}");
        }
        Ok(reading)
    }
}

/// `OpenWeatherMap` API response structures
mod openweathermap {
    use super::{DateTime, Temperature, Utc, WeatherReading};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub name: Option<String>,
        pub dt: Option<i64>,
        pub main: MainData,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        /// Celsius, because requests use `units=metric`
        pub temp: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: Option<String>,
    }

    impl CurrentWeatherResponse {
        pub fn into_reading(self, requested: &str) -> crate::Result<WeatherReading> {
            let observed_at = self
                .dt
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .unwrap_or_else(Utc::now);

            Ok(WeatherReading {
                location: self
                    .name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| requested.to_string()),
                temperature: Temperature::from_celsius(self.main.temp)?,
                description: self.weather.into_iter().find_map(|c| c.description),
                observed_at,
            })
        }
    }
}
