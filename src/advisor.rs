//! Outfit suitability check
//!
//! Decides from a garment label and the current temperature whether the
//! garment suits the weather. Rules are checked in order and the first match
//! wins:
//!
//! 1. colder than 10°C and the label contains "light" → too light
//! 2. warmer than 25°C and the label contains "coat" or "jacket" → too heavy
//! 3. otherwise suitable
//!
//! Both thresholds are strict, so exactly 10°C and 25°C are suitable.
//!
//! Terms are matched as substrings of the label, not as words. "lighthouse"
//! therefore counts as "light". This is kept as is until there is a product
//! decision on whole-word matching.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::models::{GarmentLabel, Temperature};

pub const COLD_THRESHOLD_CELSIUS: f64 = 10.0;
pub const HOT_THRESHOLD_CELSIUS: f64 = 25.0;

const LIGHT_TERMS: &[&str] = &["light"];
const HEAVY_TERMS: &[&str] = &["coat", "jacket"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityVerdict {
    TooLightForCold,
    TooHeavyForHeat,
    Suitable,
}

impl SuitabilityVerdict {
    /// Fixed user-facing message for this verdict
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            SuitabilityVerdict::TooLightForCold => {
                "Weather is too cold! A light garment is not acceptable."
            }
            SuitabilityVerdict::TooHeavyForHeat => {
                "This garment is not suitable for very hot weather."
            }
            SuitabilityVerdict::Suitable => {
                "Garment is fully suitable for the weather. Safe to wear ✅"
            }
        }
    }

    #[must_use]
    pub fn is_suitable(&self) -> bool {
        matches!(self, SuitabilityVerdict::Suitable)
    }
}

impl Display for SuitabilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

fn contains_any(label: &GarmentLabel, terms: &[&str]) -> bool {
    terms.iter().any(|term| label.contains(term))
}

/// Evaluate whether `label` is suitable for `temperature`
#[must_use]
pub fn evaluate(label: &GarmentLabel, temperature: Temperature) -> SuitabilityVerdict {
    let celsius = temperature.celsius();

    if celsius < COLD_THRESHOLD_CELSIUS && contains_any(label, LIGHT_TERMS) {
        SuitabilityVerdict::TooLightForCold
    } else if celsius > HOT_THRESHOLD_CELSIUS && contains_any(label, HEAVY_TERMS) {
        SuitabilityVerdict::TooHeavyForHeat
    } else {
        SuitabilityVerdict::Suitable
    }
}
