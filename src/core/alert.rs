//! Critical alert evaluation
//!
//! The dashboard flags acute myocardial infarction and critical conduction
//! disturbance once the displayed percentage passes the configured threshold.

use crate::domain::{Pathology, Predictions};
use std::fmt;

/// Which condition triggered the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    AcuteMyocardialInfarction,
    CriticalConductionDisturbance,
}

impl AlertKind {
    pub fn pathology(self) -> Pathology {
        match self {
            AlertKind::AcuteMyocardialInfarction => Pathology::Mi,
            AlertKind::CriticalConductionDisturbance => Pathology::Cd,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::AcuteMyocardialInfarction => f.write_str("ACUTE MYOCARDIAL INFARCTION"),
            AlertKind::CriticalConductionDisturbance => {
                f.write_str("CRITICAL CONDUCTION DISTURBANCE")
            }
        }
    }
}

/// An alert-worthy condition in the current predictions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalAlert {
    pub kind: AlertKind,
    /// Percentage that crossed the threshold
    pub value: f64,
}

impl CriticalAlert {
    /// Alert for `predictions`, if MI or CD is strictly above `threshold`
    ///
    /// MI wins when both qualify.
    pub fn evaluate(predictions: &Predictions, threshold: f64) -> Option<Self> {
        [
            AlertKind::AcuteMyocardialInfarction,
            AlertKind::CriticalConductionDisturbance,
        ]
        .into_iter()
        .map(|kind| CriticalAlert {
            kind,
            value: predictions.get(kind.pathology()),
        })
        .find(|alert| alert.value > threshold)
    }
}

impl fmt::Display for CriticalAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CRITICAL ALERT: {} ({:.1}%)", self.kind, self.value)
    }
}
