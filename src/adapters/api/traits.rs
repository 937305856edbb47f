//! Clinical API trait definition
//!
//! [`ClinicalApi`] abstracts the remote backend so the store, simulation
//! trigger and registration workflow can run against the real HTTP client or
//! an in-process fake.

use super::models::{
    ChecklistOutcome, ChecklistSubmission, LoginRequest, LoginResponse, PatientRegistration,
    SimulationRequest,
};
use crate::config::SecretString;
use crate::domain::{DiagnosticProbabilities, EcgSignal, Patient, PatientId, Result};
use async_trait::async_trait;

/// Calls the clinical backend exposes
///
/// Every call except [`login`](ClinicalApi::login) needs the session's
/// bearer token.
///
/// # Example
///
/// ```no_run
/// use cardima::adapters::api::{ClinicalApi, HttpApiClient, LoginRequest};
/// use cardima::config::{secret_string, ApiConfig};
///
/// # async fn example() -> cardima::domain::Result<()> {
/// let client = HttpApiClient::new(&ApiConfig::default())?;
/// let login = client
///     .login(&LoginRequest {
///         email: "demo@cardima.ai".to_string(),
///         password: secret_string("password123".to_string()),
///     })
///     .await?;
///
/// let patients = client.list_patients(&login.access_token).await?;
/// println!("{} patients in registry", patients.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ClinicalApi: Send + Sync {
    /// Authenticate a clinician
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the API is
    /// unreachable.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// Fetch the whole patient registry
    async fn list_patients(&self, token: &SecretString) -> Result<Vec<Patient>>;

    /// Register a patient with an ECG file and run inference on it
    ///
    /// The returned record may carry an AI validation checklist.
    async fn register_patient(
        &self,
        token: &SecretString,
        registration: &PatientRegistration,
    ) -> Result<Patient>;

    /// Send checklist answers to refine an uncertain verdict
    async fn submit_checklist(
        &self,
        token: &SecretString,
        submission: &ChecklistSubmission,
    ) -> Result<ChecklistOutcome>;

    /// Re-run inference with hypothetical biometrics
    ///
    /// Probabilities come back in `[0, 1]`.
    async fn simulate(
        &self,
        token: &SecretString,
        request: &SimulationRequest,
    ) -> Result<DiagnosticProbabilities>;

    /// Fetch raw waveform samples
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PatientNotFound`](crate::domain::ApiError::PatientNotFound)
    /// for an unknown patient.
    async fn fetch_signal(&self, token: &SecretString, patient_id: &PatientId)
        -> Result<EcgSignal>;

    /// Base URL of the API
    fn base_url(&self) -> &str;
}
