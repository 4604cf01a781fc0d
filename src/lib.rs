//! `OutfitAI` - weather-aware outfit advice from a photo of your clothing
//!
//! This library classifies a garment image, looks up the current weather,
//! asks a language model for an outfit suggestion and checks whether the
//! garment suits the temperature.

pub mod advisor;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod suggestion;
pub mod weather;

// Re-export core types for public API
pub use advisor::{SuitabilityVerdict, evaluate};
pub use cache::PersistentCache;
pub use classifier::{HttpImageClassifier, ImageClassifier};
pub use config::OutfitAiConfig;
pub use error::OutfitAiError;
pub use history::{GarmentHistory, LabelHistory};
pub use models::{Classification, GarmentLabel, Temperature, WeatherReading};
pub use pipeline::{AdvisoryPipeline, AdvisoryReport, Stage, StageFailure};
pub use presentation::{OutputFormat, ScreenLayout};
pub use suggestion::{OpenAiSuggestionClient, SuggestionGenerator};
pub use weather::{CachedWeatherProvider, OpenWeatherMapClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, OutfitAiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
