//! Scripted in-process API
//!
//! [`ScriptedApi`] answers each call from a queue of prepared responses and
//! records what it was asked. Simulation and registration responses can be
//! delayed to reproduce out-of-order completions and overlapping submits.

use super::models::{
    ChecklistOutcome, ChecklistSubmission, LoginRequest, LoginResponse, PatientRegistration,
    SimulationRequest,
};
use super::traits::ClinicalApi;
use crate::config::SecretString;
use crate::domain::{
    ApiError, CardimaError, DiagnosticProbabilities, EcgSignal, Patient, PatientId, Result,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A call received by [`ScriptedApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login { email: String },
    ListPatients,
    RegisterPatient { name: String, mrn: String },
    SubmitChecklist(ChecklistSubmission),
    Simulate(SimulationRequest),
    FetchSignal(PatientId),
}

#[derive(Default)]
struct Script {
    calls: Vec<ApiCall>,
    logins: VecDeque<Result<LoginResponse>>,
    patients: VecDeque<Result<Vec<Patient>>>,
    registrations: VecDeque<(Duration, Result<Patient>)>,
    checklists: VecDeque<Result<ChecklistOutcome>>,
    simulations: VecDeque<(Duration, Result<DiagnosticProbabilities>)>,
    signals: VecDeque<Result<EcgSignal>>,
}

/// [`ClinicalApi`] backed by queued responses
///
/// A call with nothing queued fails with a connection error.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

fn unscripted(operation: &str) -> CardimaError {
    ApiError::ConnectionFailed(format!("no scripted response for {operation}")).into()
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from the others.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_login(&self, response: Result<LoginResponse>) -> &Self {
        self.script().logins.push_back(response);
        self
    }

    pub fn push_patients(&self, response: Result<Vec<Patient>>) -> &Self {
        self.script().patients.push_back(response);
        self
    }

    pub fn push_registration(&self, response: Result<Patient>) -> &Self {
        self.push_registration_after(Duration::ZERO, response)
    }

    /// Queue a registration answer delivered after `delay`
    pub fn push_registration_after(&self, delay: Duration, response: Result<Patient>) -> &Self {
        self.script().registrations.push_back((delay, response));
        self
    }

    pub fn push_checklist(&self, response: Result<ChecklistOutcome>) -> &Self {
        self.script().checklists.push_back(response);
        self
    }

    /// Queue a simulation answer delivered after `delay`
    pub fn push_simulation(
        &self,
        delay: Duration,
        response: Result<DiagnosticProbabilities>,
    ) -> &Self {
        self.script().simulations.push_back((delay, response));
        self
    }

    pub fn push_signal(&self, response: Result<EcgSignal>) -> &Self {
        self.script().signals.push_back(response);
        self
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<ApiCall> {
        self.script().calls.clone()
    }

    /// Simulation requests received so far
    pub fn simulation_requests(&self) -> Vec<SimulationRequest> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::Simulate(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ClinicalApi for ScriptedApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let mut script = self.script();
        script.calls.push(ApiCall::Login {
            email: request.email.clone(),
        });
        script
            .logins
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("login")))
    }

    async fn list_patients(&self, _token: &SecretString) -> Result<Vec<Patient>> {
        let mut script = self.script();
        script.calls.push(ApiCall::ListPatients);
        script
            .patients
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("list_patients")))
    }

    async fn register_patient(
        &self,
        _token: &SecretString,
        registration: &PatientRegistration,
    ) -> Result<Patient> {
        let next = {
            let mut script = self.script();
            script.calls.push(ApiCall::RegisterPatient {
                name: registration.name.clone(),
                mrn: registration.mrn.to_string(),
            });
            script.registrations.pop_front()
        };

        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(unscripted("register_patient")),
        }
    }

    async fn submit_checklist(
        &self,
        _token: &SecretString,
        submission: &ChecklistSubmission,
    ) -> Result<ChecklistOutcome> {
        let mut script = self.script();
        script
            .calls
            .push(ApiCall::SubmitChecklist(submission.clone()));
        script
            .checklists
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("submit_checklist")))
    }

    async fn simulate(
        &self,
        _token: &SecretString,
        request: &SimulationRequest,
    ) -> Result<DiagnosticProbabilities> {
        let next = {
            let mut script = self.script();
            script.calls.push(ApiCall::Simulate(request.clone()));
            script.simulations.pop_front()
        };

        match next {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Err(unscripted("simulate")),
        }
    }

    async fn fetch_signal(
        &self,
        _token: &SecretString,
        patient_id: &PatientId,
    ) -> Result<EcgSignal> {
        let mut script = self.script();
        script.calls.push(ApiCall::FetchSignal(patient_id.clone()));
        script
            .signals
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("fetch_signal")))
    }

    fn base_url(&self) -> &str {
        "scripted://"
    }
}
