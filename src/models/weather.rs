//! Temperature and weather reading models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::OutfitAiError;

/// Air temperature in degrees Celsius. Always finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// Create a temperature; out-of-physical-range values are accepted as is
    pub fn from_celsius(celsius: f64) -> crate::Result<Self> {
        if !celsius.is_finite() {
            return Err(OutfitAiError::validation(format!(
                "Temperature must be a finite number, got {celsius}"
            )));
        }
        Ok(Self(celsius))
    }

    #[must_use]
    pub fn celsius(self) -> f64 {
        self.0
    }

    /// Convert temperature from Kelvin to Celsius
    pub fn from_kelvin(kelvin: f64) -> crate::Result<Self> {
        Self::from_celsius(kelvin - 273.15)
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = OutfitAiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_celsius(value)
    }
}

impl From<Temperature> for f64 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}

/// Current weather for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Location name as reported by the provider
    pub location: String,
    /// Current air temperature
    pub temperature: Temperature,
    /// Human-readable description of weather conditions
    pub description: Option<String>,
    /// When the provider observed this reading
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        self.temperature.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius() {
        let t = Temperature::from_kelvin(273.15).unwrap();
        assert!(t.celsius().abs() < 1e-9);
        let t = Temperature::from_kelvin(293.15).unwrap();
        assert!((t.celsius() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Temperature::from_celsius(f64::NAN).is_err());
        assert!(Temperature::from_celsius(f64::INFINITY).is_err());
        assert!(Temperature::from_celsius(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_out_of_range_accepted() {
        let t = Temperature::from_celsius(-300.0).unwrap();
        assert_eq!(t.celsius(), -300.0);
        assert_eq!(t.to_string(), "-300.0°C");
    }
}
