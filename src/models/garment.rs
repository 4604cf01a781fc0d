//! Garment label and classifier output models

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::OutfitAiError;

/// Normalized description of a classified garment, e.g. "light jacket".
///
/// Always trimmed, lowercase and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GarmentLabel(String);

impl GarmentLabel {
    /// Normalize raw classifier text into a label
    pub fn new(raw: impl AsRef<str>) -> crate::Result<Self> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(OutfitAiError::validation("Garment label cannot be empty"));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring containment, not whole-word matching
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.0.contains(term)
    }
}

impl Display for GarmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GarmentLabel {
    type Error = OutfitAiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GarmentLabel> for String {
    fn from(value: GarmentLabel) -> Self {
        value.0
    }
}

/// One ranked prediction returned by an image classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Raw label text as produced by the model
    pub label: String,
    /// Confidence in the range 0..=1
    pub confidence: f32,
}

impl Classification {
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Format confidence as a percentage
    #[must_use]
    pub fn format_confidence(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// Sort predictions by descending confidence and keep the best `top_k`
pub fn rank(mut classifications: Vec<Classification>, top_k: usize) -> Vec<Classification> {
    classifications.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    classifications.truncate(top_k);
    classifications
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_normalized() {
        let label = GarmentLabel::new("  Trench Coat ").unwrap();
        assert_eq!(label.as_str(), "trench coat");
        assert!(label.contains("coat"));
    }

    #[test]
    fn test_empty_label_is_rejected() {
        assert!(GarmentLabel::new("").is_err());
        assert!(GarmentLabel::new("   ").is_err());
    }

    #[test]
    fn test_label_deserialization_normalizes() {
        let label: GarmentLabel = serde_json::from_str("\"Wool COAT\"").unwrap();
        assert_eq!(label.as_str(), "wool coat");

        let empty: Result<GarmentLabel, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let ranked = rank(
            vec![
                Classification::new("jersey, T-shirt, tee shirt", 0.2),
                Classification::new("trench coat", 0.7),
                Classification::new("sweatshirt", 0.05),
            ],
            2,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "trench coat");
        assert_eq!(ranked[1].label, "jersey, T-shirt, tee shirt");
        assert_eq!(ranked[0].format_confidence(), "70.0%");
    }
}
