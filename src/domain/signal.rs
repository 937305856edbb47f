//! ECG waveform samples
//!
//! Raw per-lead sample arrays served by `GET /patients/:id/signal`.

use super::ids::PatientId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multi-lead ECG recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcgSignal {
    pub patient_id: PatientId,

    /// Samples per second
    pub sampling_rate: f64,

    /// Lead name to samples (millivolts)
    #[serde(default)]
    pub leads: BTreeMap<String, Vec<f64>>,
}

/// Summary of a single lead
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSummary {
    pub lead: String,
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub duration_seconds: f64,
}

impl EcgSignal {
    /// Per-lead summaries in lead-name order
    pub fn summaries(&self) -> Vec<LeadSummary> {
        self.leads
            .iter()
            .map(|(lead, samples)| {
                let (min, max) = samples
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                let (min, max) = if samples.is_empty() {
                    (0.0, 0.0)
                } else {
                    (min, max)
                };
                LeadSummary {
                    lead: lead.clone(),
                    samples: samples.len(),
                    min,
                    max,
                    duration_seconds: self.duration_for(samples.len()),
                }
            })
            .collect()
    }

    fn duration_for(&self, samples: usize) -> f64 {
        if self.sampling_rate > 0.0 {
            samples as f64 / self.sampling_rate
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_deserialize_and_summarize() {
        let signal: EcgSignal = serde_json::from_str(
            r#"{"patientId":"p1","samplingRate":500,"leads":{"II":[0.1,-0.4,1.2,0.0],"I":[]}}"#,
        )
        .unwrap();

        let summaries = signal.summaries();
        assert_eq!(summaries.len(), 2);

        // BTreeMap ordering: "I" before "II"
        assert_eq!(summaries[0].lead, "I");
        assert_eq!(summaries[0].samples, 0);
        assert_eq!(summaries[0].min, 0.0);

        let lead_ii = &summaries[1];
        assert_eq!(lead_ii.samples, 4);
        assert_eq!(lead_ii.min, -0.4);
        assert_eq!(lead_ii.max, 1.2);
        assert!((lead_ii.duration_seconds - 0.008).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sampling_rate_has_no_duration() {
        let signal = EcgSignal {
            patient_id: PatientId::new("p1").unwrap(),
            sampling_rate: 0.0,
            leads: BTreeMap::from([("V1".to_string(), vec![0.0; 10])]),
        };
        assert_eq!(signal.summaries()[0].duration_seconds, 0.0);
    }
}
