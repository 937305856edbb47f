//! Clinical API models
//!
//! Request and response bodies for the clinical REST API. These are kept
//! apart from the domain models and only describe the wire format.

use crate::config::SecretString;
use crate::domain::{DiagnosticProbabilities, Doctor, Mrn, Patient, PatientId, Sex};
use serde::{Deserialize, Serialize};

/// `POST /auth/login` body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// `POST /auth/login` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: SecretString,
    pub doctor: Doctor,
}

/// The ECG source file attached to a registration
#[derive(Clone, PartialEq, Eq)]
pub struct EcgAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl EcgAttachment {
    /// Wraps in-memory file contents
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

// Raw ECG bytes would flood the logs.
impl std::fmt::Debug for EcgAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcgAttachment")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Multipart fields of `POST /patients`
#[derive(Debug, Clone)]
pub struct PatientRegistration {
    pub mrn: Mrn,
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    pub height: f64,
    pub weight: f64,
    pub ecg: EcgAttachment,
}

/// `POST /patients` response
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub patient: Patient,
}

/// One answered checklist question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistAnswer {
    pub question: String,
    pub answer: String,
}

/// `POST /ai/submit-checklist` body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSubmission {
    pub patient_id: PatientId,
    pub answers: Vec<ChecklistAnswer>,
}

/// What the checklist endpoint gave back
///
/// The response shape is best-effort: when it carries the re-evaluated record
/// under `new_data` it is surfaced here, otherwise only the raw body is kept.
#[derive(Debug, Clone)]
pub struct ChecklistOutcome {
    pub updated_patient: Option<Patient>,
    pub raw: serde_json::Value,
}

impl ChecklistOutcome {
    /// Interprets a raw checklist response body
    pub fn from_value(raw: serde_json::Value) -> Self {
        let updated_patient = raw
            .get("new_data")
            .and_then(|v| serde_json::from_value::<Patient>(v.clone()).ok());
        Self {
            updated_patient,
            raw,
        }
    }
}

/// `POST /inference/simulate` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub patient_id: PatientId,
    pub weight: f64,
    pub age: u32,
}

/// `POST /inference/simulate` response
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationResponse {
    pub probabilities: DiagnosticProbabilities,
}
