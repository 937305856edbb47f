//! Patient registration workflow
//!
//! Drives intake through `Form → Processing → (Checklist | Success)`, with
//! `Checklist → Processing → Success` as an optional second pass when the
//! model asks the clinician follow-up questions. The current state is
//! published on a watch channel; every transition, including each
//! processing stage, is also sent on a broadcast channel for observers that
//! must not miss intermediate states.
//!
//! Processing stages are presentation hints only; they do not track real
//! request progress.

use crate::adapters::api::{
    ChecklistAnswer, ChecklistSubmission, ClinicalApi, EcgAttachment, PatientRegistration,
};
use crate::config::RegistrationConfig;
use crate::core::store::{AppStore, NoticeLevel};
use crate::domain::{CardimaError, ChecklistItem, Mrn, PatientId, Result, Sex};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

const MISSING_FILE: &str = "Please upload an ECG file to proceed with analysis";
const REGISTRATION_FAILED: &str = "Failed to process patient data";
const CHECKLIST_FAILED: &str = "Failed to submit checklist";
const DEFAULT_ANSWER: &str = "No";
const TRANSITION_BUFFER: usize = 16;

/// Intake form contents
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    pub ecg: Option<EcgAttachment>,
}

impl RegistrationForm {
    /// Checks the form before anything is sent
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().chars().count() < 2 {
            return Err(CardimaError::Validation("Name is required".to_string()));
        }
        if self.age > 120 {
            return Err(CardimaError::Validation(format!(
                "Age must be between 0 and 120, got {}",
                self.age
            )));
        }
        if !(0.0..=300.0).contains(&self.height) {
            return Err(CardimaError::Validation(format!(
                "Height must be between 0 and 300 cm, got {}",
                self.height
            )));
        }
        if !(0.0..=500.0).contains(&self.weight) {
            return Err(CardimaError::Validation(format!(
                "Weight must be between 0 and 500 kg, got {}",
                self.weight
            )));
        }
        if self.ecg.is_none() {
            return Err(CardimaError::Validation(MISSING_FILE.to_string()));
        }
        Ok(())
    }
}

/// Cosmetic progress hints shown while a request is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Preparing,
    Uploading,
    Inference,
    Reevaluating,
    Finalizing,
}

impl ProcessingStage {
    pub fn label(self) -> &'static str {
        match self {
            ProcessingStage::Preparing => "Preparing upload...",
            ProcessingStage::Uploading => "Uploading ECG data...",
            ProcessingStage::Inference => "Extracting waveforms & Running Inference...",
            ProcessingStage::Reevaluating => "Re-evaluating based on your input...",
            ProcessingStage::Finalizing => "Finalizing analysis...",
        }
    }

    /// Progress bar value in percent
    pub fn progress(self) -> u8 {
        match self {
            ProcessingStage::Preparing => 0,
            ProcessingStage::Uploading => 30,
            ProcessingStage::Inference => 60,
            ProcessingStage::Reevaluating => 50,
            ProcessingStage::Finalizing => 100,
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationState {
    /// Collecting demographics and the ECG file
    Form,
    /// A registration or checklist request is pending
    Processing(ProcessingStage),
    /// The model wants follow-up answers about `patient_id`
    Checklist {
        patient_id: PatientId,
        questions: Vec<ChecklistItem>,
    },
    /// Done; resets to `Form` after the dwell time
    Success { patient_id: PatientId },
}

impl RegistrationState {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationState::Form => "form",
            RegistrationState::Processing(_) => "processing",
            RegistrationState::Checklist { .. } => "checklist",
            RegistrationState::Success { .. } => "success",
        }
    }
}

/// The intake state machine
///
/// # Example
///
/// ```rust,no_run
/// use cardima::adapters::api::{ClinicalApi, EcgAttachment, HttpApiClient};
/// use cardima::adapters::token_storage::FileTokenStorage;
/// use cardima::config::{ApiConfig, RegistrationConfig};
/// use cardima::core::registration::{RegistrationForm, RegistrationState, RegistrationWorkflow};
/// use cardima::core::store::AppStore;
/// use cardima::domain::Sex;
/// use std::sync::Arc;
///
/// # async fn example() -> cardima::domain::Result<()> {
/// let api: Arc<dyn ClinicalApi> = Arc::new(HttpApiClient::new(&ApiConfig::default())?);
/// let store = AppStore::new(Arc::new(FileTokenStorage::new(".cardima/session_token")));
/// let workflow = RegistrationWorkflow::new(store, api, &RegistrationConfig::default());
///
/// let state = workflow
///     .submit(RegistrationForm {
///         name: "Jane Doe".to_string(),
///         age: 61,
///         sex: Sex::F,
///         height: 165.0,
///         weight: 72.5,
///         ecg: Some(EcgAttachment::new("ecg.csv", std::fs::read("ecg.csv")?)),
///     })
///     .await?;
///
/// if let RegistrationState::Checklist { questions, .. } = state {
///     let answers = vec!["Yes".to_string(); questions.len()];
///     workflow.submit_checklist(&answers).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct RegistrationWorkflow {
    store: AppStore,
    api: Arc<dyn ClinicalApi>,
    state: Arc<watch::Sender<RegistrationState>>,
    transitions: broadcast::Sender<RegistrationState>,
    success_dwell: Duration,
}

impl RegistrationWorkflow {
    pub fn new(store: AppStore, api: Arc<dyn ClinicalApi>, config: &RegistrationConfig) -> Self {
        let (tx, _) = watch::channel(RegistrationState::Form);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            store,
            api,
            state: Arc::new(tx),
            transitions,
            success_dwell: Duration::from_millis(config.success_dwell_ms),
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.state.borrow().clone()
    }

    /// Receiver holding the latest state
    ///
    /// Transitions made back to back collapse into the last one; use
    /// [`transitions`](Self::transitions) to see every stage.
    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.state.subscribe()
    }

    /// Receiver for every transition made after this call, in order
    pub fn transitions(&self) -> broadcast::Receiver<RegistrationState> {
        self.transitions.subscribe()
    }

    /// Register a patient from the intake form
    ///
    /// Returns the state the workflow landed in: `Checklist` when the model
    /// asked follow-up questions, `Success` otherwise.
    ///
    /// # Errors
    ///
    /// Fails with a validation error when the workflow is not in `Form`;
    /// of two overlapping submits only one proceeds. Form validation errors
    /// leave the workflow in `Form` without sending anything. API errors
    /// return it to `Form` and raise a notice.
    pub async fn submit(&self, form: RegistrationForm) -> Result<RegistrationState> {
        let current = self.state();
        if current != RegistrationState::Form {
            return Err(busy(current.name()));
        }

        if let Err(e) = form.validate() {
            self.store
                .raise_notice(NoticeLevel::Error, e.notice_message(REGISTRATION_FAILED));
            return Err(e);
        }
        let token = self.store.require_token()?;
        let Some(ecg) = form.ecg else {
            return Err(CardimaError::Validation(MISSING_FILE.to_string()));
        };

        self.claim(|current| {
            matches!(current, RegistrationState::Form)
                .then_some((RegistrationState::Processing(ProcessingStage::Preparing), ()))
        })
        .map_err(busy)?;

        let registration = PatientRegistration {
            mrn: Mrn::generate(),
            name: form.name.trim().to_string(),
            age: form.age,
            sex: form.sex,
            height: form.height,
            weight: form.weight,
            ecg,
        };
        self.transition(RegistrationState::Processing(ProcessingStage::Uploading));
        self.transition(RegistrationState::Processing(ProcessingStage::Inference));

        let patient = match self.api.register_patient(&token, &registration).await {
            Ok(patient) => patient,
            Err(e) => {
                tracing::warn!(mrn = %registration.mrn, error = %e, "Patient registration failed");
                self.transition(RegistrationState::Form);
                self.store
                    .raise_notice(NoticeLevel::Error, e.notice_message(REGISTRATION_FAILED));
                return Err(e);
            }
        };

        tracing::info!(
            patient_id = %patient.id,
            mrn = %registration.mrn,
            checklist = patient.validation_checklist().len(),
            "Patient registered"
        );

        let patient_id = patient.id.clone();
        let questions = patient.validation_checklist().to_vec();
        self.store.add_patient(patient);

        if !questions.is_empty() {
            let state = RegistrationState::Checklist {
                patient_id,
                questions,
            };
            self.transition(state.clone());
            return Ok(state);
        }

        Ok(self.succeed(patient_id, "Patient registered successfully"))
    }

    /// Answer the pending checklist
    ///
    /// `answers` lines up with the questions; missing or blank answers are
    /// sent as "No".
    ///
    /// # Errors
    ///
    /// Fails with a validation error when no checklist is pending. API errors
    /// return the workflow to `Checklist` and raise a notice.
    pub async fn submit_checklist(&self, answers: &[String]) -> Result<RegistrationState> {
        let token = self.store.require_token()?;

        let (patient_id, questions) = self
            .claim(|current| match current {
                RegistrationState::Checklist {
                    patient_id,
                    questions,
                } => Some((
                    RegistrationState::Processing(ProcessingStage::Reevaluating),
                    (patient_id.clone(), questions.clone()),
                )),
                _ => None,
            })
            .map_err(|current| {
                CardimaError::Validation(format!(
                    "No checklist awaiting answers (workflow is in {current})"
                ))
            })?;

        let submission = ChecklistSubmission {
            patient_id: patient_id.clone(),
            answers: collect_answers(&questions, answers),
        };

        match self.api.submit_checklist(&token, &submission).await {
            Ok(outcome) => {
                if let Some(updated) = outcome.updated_patient {
                    tracing::debug!(patient_id = %updated.id, "Checklist returned an updated record");
                    self.store.upsert_patient(updated);
                }
                tracing::info!(patient_id = %patient_id, "Checklist submitted");
                Ok(self.succeed(patient_id, "Patient analysis updated successfully"))
            }
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Checklist submission failed");
                self.transition(RegistrationState::Checklist {
                    patient_id,
                    questions,
                });
                self.store
                    .raise_notice(NoticeLevel::Error, e.notice_message(CHECKLIST_FAILED));
                Err(e)
            }
        }
    }

    /// Abandon a checklist or success screen and return to an empty form
    ///
    /// Has no effect while a request is pending.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| match state {
            RegistrationState::Processing(_) | RegistrationState::Form => false,
            _ => {
                self.announce(&RegistrationState::Form);
                *state = RegistrationState::Form;
                true
            }
        });
    }

    fn transition(&self, next: RegistrationState) {
        self.announce(&next);
        self.state.send_replace(next);
    }

    /// Move to the state `next` picks for the current one, in a single step
    ///
    /// Returns what `next` extracted, or the current state's name when it
    /// declined.
    fn claim<T, F>(&self, next: F) -> std::result::Result<T, &'static str>
    where
        F: FnOnce(&RegistrationState) -> Option<(RegistrationState, T)>,
    {
        let mut outcome = Err(RegistrationState::Form.name());
        self.state.send_if_modified(|current| match next(current) {
            Some((state, extracted)) => {
                self.announce(&state);
                *current = state;
                outcome = Ok(extracted);
                true
            }
            None => {
                outcome = Err(current.name());
                false
            }
        });
        outcome
    }

    fn announce(&self, next: &RegistrationState) {
        tracing::debug!(state = next.name(), "Registration workflow transition");
        // No receivers is fine.
        let _ = self.transitions.send(next.clone());
    }

    fn succeed(&self, patient_id: PatientId, message: &'static str) -> RegistrationState {
        self.transition(RegistrationState::Processing(ProcessingStage::Finalizing));
        let success = RegistrationState::Success {
            patient_id: patient_id.clone(),
        };
        self.transition(success.clone());

        let state = self.state.clone();
        let transitions = self.transitions.clone();
        let store = self.store.clone();
        let dwell = self.success_dwell;
        tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let reset = state.send_if_modified(|current| match current {
                RegistrationState::Success { patient_id: id } if *id == patient_id => {
                    *current = RegistrationState::Form;
                    true
                }
                _ => false,
            });
            if reset {
                let _ = transitions.send(RegistrationState::Form);
                store.raise_notice(NoticeLevel::Info, message);
            }
        });

        success
    }
}

fn busy(current: &str) -> CardimaError {
    CardimaError::Validation(format!(
        "Cannot register a patient while the workflow is in {current}"
    ))
}

fn collect_answers(questions: &[ChecklistItem], answers: &[String]) -> Vec<ChecklistAnswer> {
    questions
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let answer = answers
                .get(index)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .unwrap_or(DEFAULT_ANSWER);
            ChecklistAnswer {
                question: item.question.clone(),
                answer: answer.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::{ApiCall, ChecklistOutcome, ScriptedApi};
    use crate::adapters::token_storage::MemoryTokenStorage;
    use crate::domain::{ApiError, Patient};

    fn setup() -> (RegistrationWorkflow, AppStore, Arc<ScriptedApi>) {
        let store = AppStore::new(Arc::new(MemoryTokenStorage::with_token("tok1")));
        let api = Arc::new(ScriptedApi::new());
        let workflow =
            RegistrationWorkflow::new(store.clone(), api.clone(), &RegistrationConfig::default());
        (workflow, store, api)
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Jane Doe".to_string(),
            age: 61,
            sex: Sex::F,
            height: 165.0,
            weight: 72.5,
            ecg: Some(EcgAttachment::new("ecg.csv", b"0.1,0.2,0.3".to_vec())),
        }
    }

    fn registered(id: &str, questions: &[&str]) -> Patient {
        let checklist: Vec<_> = questions
            .iter()
            .map(|q| serde_json::json!({"question": q, "is_relevant": true}))
            .collect();
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": "Jane Doe",
            "ai_analysis": {"validation_checklist": checklist}
        }))
        .unwrap()
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());

        let mut f = form();
        f.name = " J ".to_string();
        assert!(matches!(f.validate(), Err(CardimaError::Validation(_))));

        let mut f = form();
        f.age = 121;
        assert!(f.validate().is_err());

        let mut f = form();
        f.height = 301.0;
        assert!(f.validate().is_err());

        let mut f = form();
        f.weight = -1.0;
        assert!(f.validate().is_err());

        let mut f = form();
        f.weight = f64::NAN;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_processing_stages() {
        assert_eq!(ProcessingStage::Preparing.progress(), 0);
        assert_eq!(ProcessingStage::Uploading.label(), "Uploading ECG data...");
        assert_eq!(ProcessingStage::Inference.progress(), 60);
        assert_eq!(ProcessingStage::Reevaluating.progress(), 50);
        assert_eq!(ProcessingStage::Finalizing.to_string(), "Finalizing analysis...");
    }

    #[test]
    fn test_missing_answers_default_to_no() {
        let questions = vec![
            ChecklistItem {
                question: "Chest pain?".to_string(),
                is_relevant: true,
            },
            ChecklistItem {
                question: "Smoker?".to_string(),
                is_relevant: true,
            },
            ChecklistItem {
                question: "Family history?".to_string(),
                is_relevant: false,
            },
        ];
        let answers = collect_answers(&questions, &["Yes".to_string(), "  ".to_string()]);
        let values: Vec<_> = answers.iter().map(|a| a.answer.as_str()).collect();
        assert_eq!(values, vec!["Yes", "No", "No"]);
        assert_eq!(answers[2].question, "Family history?");
    }

    #[tokio::test]
    async fn test_missing_file_stays_in_form() {
        let (workflow, store, api) = setup();
        let mut f = form();
        f.ecg = None;

        let err = workflow.submit(f).await.unwrap_err();

        assert!(matches!(err, CardimaError::Validation(_)));
        assert_eq!(workflow.state(), RegistrationState::Form);
        assert!(api.calls().is_empty());
        assert_eq!(
            store.snapshot().notice.unwrap().message,
            "Please upload an ECG file to proceed with analysis"
        );
    }

    #[tokio::test]
    async fn test_requires_session() {
        let store = AppStore::new(Arc::new(MemoryTokenStorage::new()));
        let api = Arc::new(ScriptedApi::new());
        let workflow = RegistrationWorkflow::new(store, api.clone(), &RegistrationConfig::default());

        let err = workflow.submit(form()).await.unwrap_err();
        assert!(matches!(err, CardimaError::Authentication(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_without_checklist_then_reset() {
        let (workflow, store, api) = setup();
        store.set_patients(vec![registered("old", &[])]);
        api.push_registration(Ok(registered("p9", &[])));

        let state = workflow.submit(form()).await.unwrap();

        assert_eq!(
            state,
            RegistrationState::Success {
                patient_id: PatientId::new("p9").unwrap()
            }
        );
        assert_eq!(store.snapshot().patients[0].id.as_str(), "p9");
        assert_eq!(store.snapshot().patients.len(), 2);
        match &api.calls()[0] {
            ApiCall::RegisterPatient { name, mrn } => {
                assert_eq!(name, "Jane Doe");
                assert!(mrn.starts_with("P-"));
            }
            other => panic!("unexpected call {other:?}"),
        }

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(matches!(workflow.state(), RegistrationState::Success { .. }));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(workflow.state(), RegistrationState::Form);
        assert_eq!(
            store.snapshot().notice.unwrap().message,
            "Patient registered successfully"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_checklist_round_trip() {
        let (workflow, store, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?", "Smoker?"])));

        let state = workflow.submit(form()).await.unwrap();
        match &state {
            RegistrationState::Checklist {
                patient_id,
                questions,
            } => {
                assert_eq!(patient_id.as_str(), "p9");
                assert_eq!(questions.len(), 2);
            }
            other => panic!("expected checklist, got {other:?}"),
        }

        let mut updated = registered("p9", &[]);
        updated.verdict = Some("Confirmed MI".to_string());
        api.push_checklist(Ok(ChecklistOutcome {
            updated_patient: Some(updated),
            raw: serde_json::Value::Null,
        }));

        let state = workflow.submit_checklist(&["Yes".to_string()]).await.unwrap();
        assert!(matches!(state, RegistrationState::Success { .. }));

        match &api.calls()[1] {
            ApiCall::SubmitChecklist(submission) => {
                assert_eq!(submission.patient_id.as_str(), "p9");
                assert_eq!(submission.answers[0].answer, "Yes");
                assert_eq!(submission.answers[1].answer, "No");
            }
            other => panic!("unexpected call {other:?}"),
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.patients.len(), 1);
        assert_eq!(snapshot.patients[0].verdict.as_deref(), Some("Confirmed MI"));

        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(workflow.state(), RegistrationState::Form);
    }

    #[tokio::test]
    async fn test_registration_failure_returns_to_form() {
        let (workflow, store, api) = setup();
        api.push_registration(Err(ApiError::ClientError {
            status: 409,
            message: "MRN already exists".to_string(),
        }
        .into()));

        assert!(workflow.submit(form()).await.is_err());

        assert_eq!(workflow.state(), RegistrationState::Form);
        let state = store.snapshot();
        assert!(state.patients.is_empty());
        let notice = state.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "MRN already exists");
    }

    #[tokio::test]
    async fn test_checklist_failure_returns_to_checklist() {
        let (workflow, store, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?"])));
        api.push_checklist(Err(ApiError::Timeout("slow".to_string()).into()));

        workflow.submit(form()).await.unwrap();
        assert!(workflow.submit_checklist(&[]).await.is_err());

        assert_eq!(workflow.state().name(), "checklist");
        assert_eq!(
            store.snapshot().notice.unwrap().message,
            "Failed to submit checklist"
        );
    }

    #[tokio::test]
    async fn test_checklist_without_pending_questions_is_rejected() {
        let (workflow, _, api) = setup();
        let err = workflow.submit_checklist(&[]).await.unwrap_err();
        assert!(matches!(err, CardimaError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected_outside_form() {
        let (workflow, _, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?"])));
        workflow.submit(form()).await.unwrap();

        let err = workflow.submit(form()).await.unwrap_err();
        assert!(matches!(err, CardimaError::Validation(_)));

        workflow.reset();
        assert_eq!(workflow.state(), RegistrationState::Form);
    }

    #[tokio::test]
    async fn test_transitions_are_observable() {
        let (workflow, _, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?"])));
        let mut rx = workflow.subscribe();

        workflow.submit(form()).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().name(), "checklist");
    }

    fn drain(rx: &mut broadcast::Receiver<RegistrationState>) -> Vec<RegistrationState> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_stage_is_broadcast() {
        let (workflow, _, api) = setup();
        api.push_registration(Ok(registered("p9", &[])));
        let mut rx = workflow.transitions();

        workflow.submit(form()).await.unwrap();
        let patient_id = PatientId::new("p9").unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                RegistrationState::Processing(ProcessingStage::Preparing),
                RegistrationState::Processing(ProcessingStage::Uploading),
                RegistrationState::Processing(ProcessingStage::Inference),
                RegistrationState::Processing(ProcessingStage::Finalizing),
                RegistrationState::Success { patient_id },
            ]
        );

        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(drain(&mut rx), vec![RegistrationState::Form]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checklist_stages_are_broadcast() {
        let (workflow, _, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?"])));
        api.push_checklist(Err(ApiError::Timeout("slow".to_string()).into()));
        workflow.submit(form()).await.unwrap();
        let mut rx = workflow.transitions();

        assert!(workflow.submit_checklist(&[]).await.is_err());

        let names: Vec<_> = drain(&mut rx).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["processing", "checklist"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submits_register_once() {
        let (workflow, _, api) = setup();
        api.push_registration_after(
            Duration::from_millis(500),
            Ok(registered("p9", &["Chest pain?"])),
        );

        let (first, second) = tokio::join!(workflow.submit(form()), workflow.submit(form()));

        assert!(matches!(first, Ok(RegistrationState::Checklist { .. })));
        assert!(matches!(second, Err(CardimaError::Validation(_))));
        assert_eq!(api.calls().len(), 1);
        assert_eq!(workflow.state().name(), "checklist");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_checklist_answers_submit_once() {
        let (workflow, _, api) = setup();
        api.push_registration(Ok(registered("p9", &["Chest pain?"])));
        workflow.submit(form()).await.unwrap();
        api.push_checklist(Ok(ChecklistOutcome {
            updated_patient: None,
            raw: serde_json::Value::Null,
        }));

        let answers = vec!["Yes".to_string()];
        let (first, second) = tokio::join!(
            workflow.submit_checklist(&answers),
            workflow.submit_checklist(&answers)
        );

        assert!(matches!(first, Ok(RegistrationState::Success { .. })));
        assert!(matches!(second, Err(CardimaError::Validation(_))));
        let submissions = api
            .calls()
            .into_iter()
            .filter(|call| matches!(call, ApiCall::SubmitChecklist(_)))
            .count();
        assert_eq!(submissions, 1);
    }
}
