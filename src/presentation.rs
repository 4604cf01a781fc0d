//! Rendering of advisory results for the terminal

use anyhow::Result;
use std::fmt::Write;
use std::str::FromStr;

use crate::OutfitAiError;
use crate::advisor::SuitabilityVerdict;
use crate::models::{GarmentLabel, Temperature};
use crate::pipeline::AdvisoryReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenLayout {
    /// Classifier ranking, weather, suggestion and feedback
    #[default]
    Full,
    /// Garment, temperature and feedback only
    Compact,
}

impl FromStr for ScreenLayout {
    type Err = OutfitAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ScreenLayout::Full),
            "compact" => Ok(ScreenLayout::Compact),
            other => Err(OutfitAiError::validation(format!(
                "Unknown layout '{other}'. Must be one of: full, compact"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = OutfitAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(OutfitAiError::validation(format!(
                "Unknown output format '{other}'. Must be one of: text, json"
            ))),
        }
    }
}

fn feedback_block(out: &mut String, verdict: SuitabilityVerdict) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "🤖 AI Feedback:")?;
    writeln!(out, "   {}", verdict.message())
}

/// Render a report as terminal text
pub fn render_text(report: &AdvisoryReport, layout: ScreenLayout) -> Result<String> {
    let mut out = String::new();

    if layout == ScreenLayout::Full {
        if let Some(source) = &report.image_source {
            writeln!(out, "🖼️  Image: {source}")?;
        }
    }

    if let Some(label) = &report.garment {
        writeln!(out, "👕 Garment type: {label}")?;
    }

    if layout == ScreenLayout::Full && report.classifications.len() > 1 {
        for candidate in report.classifications.iter().skip(1) {
            writeln!(
                out,
                "   also possible: {} ({})",
                candidate.label,
                candidate.format_confidence()
            )?;
        }
    }

    if let Some(weather) = &report.weather {
        match (&weather.description, layout) {
            (Some(description), ScreenLayout::Full) => writeln!(
                out,
                "🌡️  Air temperature: {} in {} ({description})",
                weather.format_temperature(),
                weather.location
            )?,
            _ => writeln!(out, "🌡️  Air temperature: {}", weather.format_temperature())?,
        }
    }

    if layout == ScreenLayout::Full {
        if let Some(suggestion) = &report.suggestion {
            writeln!(out)?;
            writeln!(out, "💡 {suggestion}")?;
        }
    }

    if let Some(verdict) = report.verdict {
        feedback_block(&mut out, verdict)?;
    }

    Ok(out)
}

/// Render a direct label/temperature evaluation
pub fn render_verdict(
    label: &GarmentLabel,
    temperature: Temperature,
    verdict: SuitabilityVerdict,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "garment": label,
            "temperature_celsius": temperature,
            "verdict": verdict,
            "message": verdict.message(),
        }))?),
        OutputFormat::Text => {
            let mut out = String::new();
            writeln!(out, "👕 Garment type: {label}")?;
            writeln!(out, "🌡️  Air temperature: {temperature}")?;
            feedback_block(&mut out, verdict)?;
            Ok(out)
        }
    }
}

pub fn render_report(report: &AdvisoryReport, layout: ScreenLayout, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => render_text(report, layout),
    }
}
