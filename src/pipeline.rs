//! One advisory request from image bytes to verdict
//!
//! Classification and the weather lookup do not depend on each other and run
//! concurrently. The suggestion needs both results. The verdict needs the
//! label and the temperature only, so a failed suggestion still gets one.
//! A failing stage is logged and recorded in the report; later stages that
//! need its output are skipped.

use serde::Serialize;
use std::fmt::Display;
use tracing::{error, info, instrument, warn};

use crate::advisor::{self, SuitabilityVerdict};
use crate::classifier::ImageClassifier;
use crate::history::GarmentHistory;
use crate::models::{Classification, GarmentLabel, WeatherReading};
use crate::suggestion::SuggestionGenerator;
use crate::weather::WeatherProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Classification,
    Weather,
    Suggestion,
    History,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Classification => "classification",
            Stage::Weather => "weather",
            Stage::Suggestion => "suggestion",
            Stage::History => "history",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// Everything known after one request. Fields stay empty when their stage failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdvisoryReport {
    /// Where the image came from (file path or "stdin")
    pub image_source: Option<String>,
    pub classifications: Vec<Classification>,
    pub garment: Option<GarmentLabel>,
    pub weather: Option<WeatherReading>,
    pub suggestion: Option<String>,
    pub verdict: Option<SuitabilityVerdict>,
    pub failures: Vec<StageFailure>,
}

impl AdvisoryReport {
    fn fail(&mut self, stage: Stage, err: &anyhow::Error) {
        self.failures.push(StageFailure {
            stage,
            message: format!("{err:#}"),
        });
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct AdvisoryPipeline {
    classifier: Box<dyn ImageClassifier>,
    weather: Box<dyn WeatherProvider>,
    suggestions: Option<Box<dyn SuggestionGenerator>>,
    history: Option<Box<dyn GarmentHistory>>,
}

impl AdvisoryPipeline {
    pub fn new(classifier: Box<dyn ImageClassifier>, weather: Box<dyn WeatherProvider>) -> Self {
        Self {
            classifier,
            weather,
            suggestions: None,
            history: None,
        }
    }

    #[must_use]
    pub fn with_suggestions(mut self, generator: Box<dyn SuggestionGenerator>) -> Self {
        self.suggestions = Some(generator);
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Box<dyn GarmentHistory>) -> Self {
        self.history = Some(history);
        self
    }

    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn run(&self, image: &[u8], location: &str) -> AdvisoryReport {
        let mut report = AdvisoryReport::default();

        let (classified, weather) =
            tokio::join!(self.classifier.classify(image), self.weather.current(location));

        match classified {
            Ok(classifications) => {
                match classifications.first().map(|best| GarmentLabel::new(&best.label)) {
                    Some(Ok(label)) => {
                        info!("Detected clothing: {}", label);
                        report.garment = Some(label);
                    }
                    Some(Err(e)) => {
                        let err = anyhow::Error::from(e);
                        error!("Classifier returned an unusable label: {err:#}");
                        report.fail(Stage::Classification, &err);
                    }
                    None => {
                        let err = anyhow::anyhow!("No garment detected in image");
                        warn!("{err}");
                        report.fail(Stage::Classification, &err);
                    }
                }
                report.classifications = classifications;
            }
            Err(e) => {
                error!("Error analyzing image: {e:#}");
                report.fail(Stage::Classification, &e);
            }
        }

        match weather {
            Ok(reading) => report.weather = Some(reading),
            Err(e) => {
                error!("Weather API error: {e:#}");
                report.fail(Stage::Weather, &e);
            }
        }

        if let (Some(history), Some(label)) = (&self.history, &report.garment) {
            if let Err(e) = history.remember(label).await {
                warn!("Failed to remember last garment: {e:#}");
                report.fail(Stage::History, &e);
            }
        }

        let (Some(label), Some(reading)) = (report.garment.clone(), report.weather.clone()) else {
            return report;
        };

        if let Some(generator) = &self.suggestions {
            match generator.suggest(&label, reading.temperature).await {
                Ok(text) => report.suggestion = Some(text),
                Err(e) => {
                    error!("Suggestion error: {e:#}");
                    report.fail(Stage::Suggestion, &e);
                }
            }
        }

        let verdict = advisor::evaluate(&label, reading.temperature);
        info!(?verdict, "Evaluated outfit");
        report.verdict = Some(verdict);

        report
    }
}
