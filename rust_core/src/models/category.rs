//! Deal categories and display classification bands

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Deal category a listing arrives tagged with.
///
/// The classification worker emits the three known codes; anything else,
/// including untagged listings, decodes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartelCategory {
    Autobuy,
    Good,
    Ok,
    Unknown,
}

impl CartelCategory {
    /// Map a raw category code to the enum. Unrecognized codes become `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "AUTOBUY" => CartelCategory::Autobuy,
            "GOOD" => CartelCategory::Good,
            "OK" => CartelCategory::Ok,
            _ => CartelCategory::Unknown,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            CartelCategory::Autobuy => "AUTOBUY",
            CartelCategory::Good => "GOOD",
            CartelCategory::Ok => "OK",
            CartelCategory::Unknown => "UNKNOWN",
        }
    }
}

impl Default for CartelCategory {
    fn default() -> Self {
        CartelCategory::Unknown
    }
}

impl Serialize for CartelCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CartelCategory::Unknown => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_code()),
        }
    }
}

impl<'de> Deserialize<'de> for CartelCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(code)) => CartelCategory::from_code(&code),
            _ => CartelCategory::Unknown,
        })
    }
}

/// Filter values exposed by the dashboard category control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    All,
    Autobuy,
    Alert,
    Info,
}

impl CategoryFilter {
    /// Category code this filter selects; `None` means no restriction.
    pub fn target_category(&self) -> Option<CartelCategory> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Autobuy => Some(CartelCategory::Autobuy),
            CategoryFilter::Alert => Some(CartelCategory::Good),
            CategoryFilter::Info => Some(CartelCategory::Ok),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Autobuy => "autobuy",
            CategoryFilter::Alert => "alert",
            CategoryFilter::Info => "info",
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::All
    }
}

/// Confidence band for the ALT value estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    Unknown,
}

impl ConfidenceBand {
    /// Band for a 0-100 confidence score.
    pub fn from_confidence(confidence: Option<f64>) -> Self {
        match confidence {
            None => ConfidenceBand::Unknown,
            Some(c) if c > 75.0 => ConfidenceBand::High,
            Some(c) if c > 40.0 => ConfidenceBand::Medium,
            Some(_) => ConfidenceBand::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
            ConfidenceBand::Unknown => "unknown",
        }
    }
}
