//! Data models for the OutfitAI application
//!
//! This module contains the core domain models organized by concern:
//! - Garment: Classifier output and the normalized garment label
//! - Weather: Temperatures and current weather readings

pub mod garment;
pub mod weather;

// Re-export all public types for convenient access
pub use garment::{Classification, GarmentLabel};
pub use weather::{Temperature, WeatherReading};
