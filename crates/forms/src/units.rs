//! Measurement units and the conversions the wizard forms rely on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Metres per yard. Yardage arrives from Ravelry in yards.
pub const METRES_PER_YARD: f64 = 0.9144;

/// Unit system a knitter entered their numbers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Inches,
    Centimeters,
}

impl Units {
    /// Detect units from the add-on label rendered next to an input.
    pub fn from_addon_label(label: &str) -> Self {
        if label.contains("cm") {
            Self::Centimeters
        } else {
            Self::Inches
        }
    }

    /// Read `CUSTOMFIT_UNITS`, falling back to `default` when unset or invalid.
    pub fn from_env_or(default: Self) -> Self {
        std::env::var("CUSTOMFIT_UNITS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Factor that turns a length in these units into inches when dividing.
    pub const fn conversion(self) -> f64 {
        match self {
            Self::Inches => 1.0,
            Self::Centimeters => CM_PER_INCH,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inches => write!(f, "inches"),
            Self::Centimeters => write!(f, "cm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown units '{0}', expected inches or cm")]
pub struct ParseUnitsError(String);

impl FromStr for Units {
    type Err = ParseUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(Self::Inches),
            "cm" | "centimeters" | "centimetres" => Ok(Self::Centimeters),
            other => Err(ParseUnitsError(other.to_string())),
        }
    }
}

/// Rescale factor for values written into a field labelled with `label`.
///
/// Only yardage fields shown in metres are rescaled.
pub fn write_rescale(label: &str) -> Option<f64> {
    (label.trim() == "metres").then_some(METRES_PER_YARD)
}
