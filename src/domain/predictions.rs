//! Diagnostic probabilities and displayed predictions
//!
//! The API reports per-pathology probabilities in `[0, 1]`
//! ([`DiagnosticProbabilities`]); the dashboard shows percentages in
//! `[0, 100]` ([`Predictions`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five PTB-XL superclasses the model scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pathology {
    /// Normal ECG
    Norm,
    /// Myocardial infarction
    Mi,
    /// ST/T changes
    Sttc,
    /// Conduction disturbance
    Cd,
    /// Hypertrophy
    Hyp,
}

impl Pathology {
    /// Wire order of the probability keys
    pub const ALL: [Pathology; 5] = [
        Pathology::Norm,
        Pathology::Mi,
        Pathology::Sttc,
        Pathology::Cd,
        Pathology::Hyp,
    ];

    /// Order used by the diagnostic profile panel
    pub const DISPLAY_ORDER: [Pathology; 5] = [
        Pathology::Mi,
        Pathology::Sttc,
        Pathology::Cd,
        Pathology::Hyp,
        Pathology::Norm,
    ];

    /// Wire key (`"MI"`, `"STTC"`, ...)
    pub fn code(self) -> &'static str {
        match self {
            Pathology::Norm => "NORM",
            Pathology::Mi => "MI",
            Pathology::Sttc => "STTC",
            Pathology::Cd => "CD",
            Pathology::Hyp => "HYP",
        }
    }

    /// Long label for the profile panel
    pub fn label(self) -> &'static str {
        match self {
            Pathology::Norm => "Normal",
            Pathology::Mi => "Myocardial Infarction",
            Pathology::Sttc => "ST/T Changes",
            Pathology::Cd => "Conduction Disturbance",
            Pathology::Hyp => "Hypertrophy",
        }
    }

    /// Registry-table diagnosis wording
    pub fn diagnosis(self) -> &'static str {
        match self {
            Pathology::Norm => "Normal Sinus Rhythm",
            Pathology::Mi => "Acute MI",
            Pathology::Sttc => "ST/T Changes",
            Pathology::Cd => "Conduction Disturbance",
            Pathology::Hyp => "Hypertrophy",
        }
    }
}

impl fmt::Display for Pathology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Probabilities as reported by the API, each in `[0, 1]`
///
/// Missing keys deserialize to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct DiagnosticProbabilities {
    #[serde(default)]
    pub norm: f64,
    #[serde(default)]
    pub mi: f64,
    #[serde(default)]
    pub sttc: f64,
    #[serde(default)]
    pub cd: f64,
    #[serde(default)]
    pub hyp: f64,
}

impl DiagnosticProbabilities {
    /// Probability for one pathology
    pub fn get(&self, pathology: Pathology) -> f64 {
        match pathology {
            Pathology::Norm => self.norm,
            Pathology::Mi => self.mi,
            Pathology::Sttc => self.sttc,
            Pathology::Cd => self.cd,
            Pathology::Hyp => self.hyp,
        }
    }

    /// Highest-scoring pathology; ties keep the earlier key in wire order
    pub fn dominant(&self) -> Pathology {
        let mut best = Pathology::ALL[0];
        for pathology in Pathology::ALL.into_iter().skip(1) {
            if self.get(pathology) > self.get(best) {
                best = pathology;
            }
        }
        best
    }
}

/// Displayed predictions, each a percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Predictions {
    pub mi: f64,
    pub sttc: f64,
    pub cd: f64,
    pub hyp: f64,
    pub norm: f64,
}

impl Predictions {
    /// Scales API probabilities to percentages
    pub fn from_probabilities(probabilities: &DiagnosticProbabilities) -> Self {
        Self {
            mi: probabilities.mi * 100.0,
            sttc: probabilities.sttc * 100.0,
            cd: probabilities.cd * 100.0,
            hyp: probabilities.hyp * 100.0,
            norm: probabilities.norm * 100.0,
        }
    }

    /// Percentage for one pathology
    pub fn get(&self, pathology: Pathology) -> f64 {
        match pathology {
            Pathology::Norm => self.norm,
            Pathology::Mi => self.mi,
            Pathology::Sttc => self.sttc,
            Pathology::Cd => self.cd,
            Pathology::Hyp => self.hyp,
        }
    }

    /// Merges the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: PredictionsPatch) {
        if let Some(v) = patch.mi {
            self.mi = v;
        }
        if let Some(v) = patch.sttc {
            self.sttc = v;
        }
        if let Some(v) = patch.cd {
            self.cd = v;
        }
        if let Some(v) = patch.hyp {
            self.hyp = v;
        }
        if let Some(v) = patch.norm {
            self.norm = v;
        }
    }
}

/// Partial update for [`Predictions`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictionsPatch {
    pub mi: Option<f64>,
    pub sttc: Option<f64>,
    pub cd: Option<f64>,
    pub hyp: Option<f64>,
    pub norm: Option<f64>,
}

impl From<Predictions> for PredictionsPatch {
    fn from(p: Predictions) -> Self {
        Self {
            mi: Some(p.mi),
            sttc: Some(p.sttc),
            cd: Some(p.cd),
            hyp: Some(p.hyp),
            norm: Some(p.norm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default_to_zero() {
        let probs: DiagnosticProbabilities = serde_json::from_str(r#"{"MI":0.4}"#).unwrap();
        assert_eq!(probs.mi, 0.4);
        assert_eq!(probs.norm, 0.0);
        assert_eq!(probs.hyp, 0.0);
    }

    #[test]
    fn test_from_probabilities_scales_each_key() {
        let probs = DiagnosticProbabilities {
            norm: 0.1,
            mi: 0.5,
            sttc: 0.25,
            cd: 0.75,
            hyp: 1.0,
        };
        let p = Predictions::from_probabilities(&probs);
        assert_eq!(p.mi, 50.0);
        assert_eq!(p.sttc, 25.0);
        assert_eq!(p.cd, 75.0);
        assert_eq!(p.hyp, 100.0);
        assert_eq!(p.norm, 10.0);
    }

    #[test]
    fn test_apply_patch_keeps_unspecified_fields() {
        let mut p = Predictions {
            mi: 1.0,
            sttc: 2.0,
            cd: 3.0,
            hyp: 4.0,
            norm: 5.0,
        };
        p.apply(PredictionsPatch {
            cd: Some(30.0),
            ..Default::default()
        });
        assert_eq!(p.cd, 30.0);
        assert_eq!(p.mi, 1.0);
        assert_eq!(p.norm, 5.0);
    }

    #[test]
    fn test_dominant_pathology() {
        let probs = DiagnosticProbabilities {
            mi: 0.8,
            cd: 0.3,
            ..Default::default()
        };
        assert_eq!(probs.dominant(), Pathology::Mi);
    }

    #[test]
    fn test_dominant_tie_keeps_wire_order() {
        let probs = DiagnosticProbabilities {
            norm: 0.5,
            hyp: 0.5,
            ..Default::default()
        };
        assert_eq!(probs.dominant(), Pathology::Norm);
    }

    #[test]
    fn test_predictions_wire_keys() {
        let json = serde_json::to_value(Predictions::default()).unwrap();
        for key in ["MI", "STTC", "CD", "HYP", "NORM"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
