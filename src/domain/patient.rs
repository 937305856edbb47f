//! Patient domain model
//!
//! A clinical record with demographics, ECG-derived diagnostic probabilities
//! and a predicted risk level. Field names follow the API's JSON.

use super::ids::PatientId;
use super::predictions::DiagnosticProbabilities;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Biological sex as recorded by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sex {
    #[default]
    #[serde(alias = "Male", alias = "male")]
    M,
    #[serde(alias = "Female", alias = "female")]
    F,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::M),
            "f" | "female" => Ok(Sex::F),
            other => Err(format!("Invalid sex '{other}'. Must be one of: M, F")),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::M => f.write_str("M"),
            Sex::F => f.write_str("F"),
        }
    }
}

/// Model-predicted risk level
///
/// The API is inconsistent about casing ("High", "HIGH"), so parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Sort weight, higher is more urgent
    pub fn priority(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("Low"),
            RiskLevel::Medium => f.write_str("Medium"),
            RiskLevel::High => f.write_str("High"),
        }
    }
}

// Unknown risk strings are treated as absent rather than failing the record.
fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Patient demographics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    pub sex: Sex,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
}

/// One AI-generated follow-up question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub question: String,
    #[serde(default)]
    pub is_relevant: bool,
}

/// AI narrative attached to a patient record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub narrative_report: String,
    #[serde(default)]
    pub recommended_tests: Vec<String>,
    #[serde(default)]
    pub validation_checklist: Vec<ChecklistItem>,
}

/// A registry record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "_id", alias = "id")]
    pub id: PatientId,

    #[serde(default)]
    pub mrn: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub demographics: Option<Demographics>,

    #[serde(default)]
    pub last_ecg_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub diagnostic_probabilities: Option<DiagnosticProbabilities>,

    #[serde(default, deserialize_with = "lenient_risk")]
    pub predicted_risk_level: Option<RiskLevel>,

    #[serde(default)]
    pub verdict: Option<String>,

    #[serde(default)]
    pub doctor_validation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ecg_path: Option<String>,

    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
}

impl Patient {
    /// Risk level used for filtering and sorting; unknown counts as low
    pub fn effective_risk(&self) -> RiskLevel {
        self.predicted_risk_level.unwrap_or(RiskLevel::Low)
    }

    /// Badge text in the dashboard header
    pub fn status_label(&self) -> &'static str {
        match self.predicted_risk_level {
            Some(RiskLevel::High) => "CRITICAL",
            Some(RiskLevel::Medium) => "MONITORING",
            _ => "STABLE",
        }
    }

    /// Diagnosis column in the registry table
    pub fn primary_diagnosis(&self) -> &'static str {
        match &self.diagnostic_probabilities {
            Some(probabilities) => probabilities.dominant().diagnosis(),
            None => "Routine Checkup",
        }
    }

    /// Follow-up questions the AI wants answered, if any
    pub fn validation_checklist(&self) -> &[ChecklistItem] {
        self.ai_analysis
            .as_ref()
            .map(|a| a.validation_checklist.as_slice())
            .unwrap_or(&[])
    }
}
