//! Application state store
//!
//! [`AppStore`] is the single source of truth for the session, the patient
//! registry, the simulator controls and the displayed predictions. State lives
//! in a `tokio::sync::watch` channel: every mutator is one synchronous
//! `send_modify`, so updates from concurrent response handlers never
//! interleave and the last write wins. Observers call [`AppStore::subscribe`]
//! and re-render whenever the state changes.
//!
//! # Example
//!
//! ```rust
//! use cardima::adapters::token_storage::MemoryTokenStorage;
//! use cardima::core::store::{AppStore, SimulationPatch};
//! use std::sync::Arc;
//!
//! let store = AppStore::new(Arc::new(MemoryTokenStorage::new()));
//! store.set_simulation(SimulationPatch {
//!     is_simulating: Some(true),
//!     simulated_age: Some(60),
//!     ..Default::default()
//! });
//! assert_eq!(store.snapshot().simulation.simulated_age, 60);
//! ```

use crate::adapters::token_storage::TokenStorage;
use crate::config::{SecretString, SimulationConfig};
use crate::domain::{
    CardimaError, Demographics, Doctor, Patient, PatientId, Predictions, PredictionsPatch, Result,
    Sex,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// The authenticated clinician and their access token
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub doctor: Option<Doctor>,
    pub token: Option<SecretString>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Baseline demographics seeding the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientData {
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub sex: Sex,
}

impl Default for PatientData {
    fn default() -> Self {
        Self {
            age: 45,
            weight: 70.0,
            height: 175.0,
            sex: Sex::M,
        }
    }
}

impl PatientData {
    /// Merges the fields present in `patch`
    pub fn apply(&mut self, patch: PatientDataPatch) {
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(sex) = patch.sex {
            self.sex = sex;
        }
    }
}

/// Partial update for [`PatientData`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatientDataPatch {
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub sex: Option<Sex>,
}

impl From<&Demographics> for PatientDataPatch {
    fn from(d: &Demographics) -> Self {
        Self {
            age: Some(d.age),
            weight: Some(d.weight),
            height: Some(d.height),
            sex: Some(d.sex),
        }
    }
}

/// Simulator controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub is_simulating: bool,
    pub simulated_age: u32,
    pub simulated_weight: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        let baseline = PatientData::default();
        Self {
            is_simulating: false,
            simulated_age: baseline.age,
            simulated_weight: baseline.weight,
        }
    }
}

/// Partial update for [`SimulationState`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationPatch {
    pub is_simulating: Option<bool>,
    pub simulated_age: Option<u32>,
    pub simulated_weight: Option<f64>,
}

/// Where the displayed predictions came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PredictionOrigin {
    /// The active patient's stored probabilities
    #[default]
    Baseline,
    /// A what-if inference response
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Transient, dismissible user-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Everything the views render from
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: Session,
    /// Registry, most recently registered first
    pub patients: Vec<Patient>,
    /// Patient currently shown on the dashboard
    pub active_patient: Option<PatientId>,
    pub patient_data: PatientData,
    pub simulation: SimulationState,
    pub predictions: Predictions,
    pub prediction_origin: PredictionOrigin,
    /// Stored predictions of the active patient, restored when simulation stops
    pub baseline_predictions: Option<Predictions>,
    pub notice: Option<Notice>,
    /// Simulation requests awaiting a response
    pub simulations_in_flight: usize,
    /// Bumped on every simulation reset, so an off/on toggle is visible even
    /// when observers only see the final state
    pub simulation_resets: u64,
}

impl AppState {
    /// The active patient's registry record
    pub fn active_record(&self) -> Option<&Patient> {
        let id = self.active_patient.as_ref()?;
        self.patients.iter().find(|p| &p.id == id)
    }

    pub fn find_patient(&self, id: &PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| &p.id == id)
    }

    /// Simulation off, simulated values and predictions back to the baseline
    fn reset_simulation(&mut self) {
        self.simulation = SimulationState {
            is_simulating: false,
            simulated_age: self.patient_data.age,
            simulated_weight: self.patient_data.weight,
        };
        self.simulation_resets += 1;
        if self.prediction_origin == PredictionOrigin::Simulation {
            self.predictions = self.baseline_predictions.unwrap_or_default();
            self.prediction_origin = PredictionOrigin::Baseline;
        }
    }
}

/// Shared handle to the application state
///
/// Cloning is cheap; all clones observe and mutate the same state.
#[derive(Clone)]
pub struct AppStore {
    state: Arc<watch::Sender<AppState>>,
    storage: Arc<dyn TokenStorage>,
    limits: SimulationConfig,
}

impl AppStore {
    /// Create a store, restoring any persisted access token
    ///
    /// A token that cannot be read is logged and treated as absent.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore session token");
                None
            }
        };

        let state = AppState {
            session: Session {
                doctor: None,
                token,
            },
            ..Default::default()
        };
        let (tx, _) = watch::channel(state);

        Self {
            state: Arc::new(tx),
            storage,
            limits: SimulationConfig::default(),
        }
    }

    /// Clamp simulated biometrics to the given slider ranges
    pub fn with_simulation_limits(mut self, limits: SimulationConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Read from the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn token(&self) -> Option<SecretString> {
        self.read(|s| s.session.token.clone())
    }

    /// The access token, or an authentication error when signed out
    pub fn require_token(&self) -> Result<SecretString> {
        self.token().ok_or_else(|| {
            CardimaError::Authentication("Not signed in. Run `cardima login` first".to_string())
        })
    }

    /// Store the session and persist its token
    pub fn set_auth(&self, doctor: Doctor, token: SecretString) {
        if let Err(e) = self.storage.save(&token) {
            tracing::warn!(error = %e, "Failed to persist session token");
        }
        tracing::info!(doctor_id = %doctor.id, "Signed in");
        self.state.send_modify(|s| {
            s.session = Session {
                doctor: Some(doctor),
                token: Some(token),
            };
        });
    }

    /// Clear the session and the persisted token
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session token");
        }
        self.state.send_modify(|s| s.session = Session::default());
        tracing::info!("Signed out");
    }

    /// Replace the registry wholesale
    pub fn set_patients(&self, patients: Vec<Patient>) {
        tracing::debug!(count = patients.len(), "Registry replaced");
        self.state.send_modify(|s| s.patients = patients);
    }

    /// Prepend a newly registered patient
    pub fn add_patient(&self, patient: Patient) {
        self.state.send_modify(|s| s.patients.insert(0, patient));
    }

    /// Replace the record with the same id, or prepend it when new
    pub fn upsert_patient(&self, patient: Patient) {
        self.state.send_modify(|s| {
            match s.patients.iter_mut().find(|p| p.id == patient.id) {
                Some(existing) => *existing = patient,
                None => s.patients.insert(0, patient),
            }
        });
    }

    pub fn set_patient_data(&self, patch: PatientDataPatch) {
        self.state.send_modify(|s| s.patient_data.apply(patch));
    }

    /// Merge into the simulator controls
    ///
    /// Turning simulation off resets the simulated values to the baseline and
    /// restores the stored predictions if a simulation result was on display.
    pub fn set_simulation(&self, patch: SimulationPatch) {
        let limits = &self.limits;
        self.state.send_modify(|s| {
            if let Some(age) = patch.simulated_age {
                s.simulation.simulated_age = limits.clamp_age(age);
            }
            if let Some(weight) = patch.simulated_weight {
                s.simulation.simulated_weight = limits.clamp_weight(weight);
            }
            if let Some(is_simulating) = patch.is_simulating {
                s.simulation.is_simulating = is_simulating;
            }

            if patch.is_simulating == Some(false) {
                s.reset_simulation();
            }
        });
    }

    /// Simulation off, simulated values back to the baseline demographics
    ///
    /// A simulation result on display is replaced by the stored predictions.
    pub fn reset_simulation(&self) {
        self.state.send_modify(AppState::reset_simulation);
    }

    /// Merge into the displayed predictions
    pub fn set_predictions(&self, patch: PredictionsPatch, origin: PredictionOrigin) {
        self.state.send_modify(|s| {
            s.predictions.apply(patch);
            s.prediction_origin = origin;
        });
    }

    /// Show `patient` on the dashboard
    ///
    /// Seeds the baseline demographics, resets the simulator and shows the
    /// stored probabilities as percentages.
    pub fn load_patient(&self, patient: &Patient) {
        let baseline = patient
            .diagnostic_probabilities
            .as_ref()
            .map(Predictions::from_probabilities);

        tracing::debug!(patient_id = %patient.id, "Loading patient");
        self.state.send_modify(|s| {
            s.active_patient = Some(patient.id.clone());
            if let Some(demographics) = &patient.demographics {
                s.patient_data.apply(PatientDataPatch::from(demographics));
            }
            s.reset_simulation();
            s.baseline_predictions = baseline;
            s.predictions = baseline.unwrap_or_default();
            s.prediction_origin = PredictionOrigin::Baseline;
        });
    }

    /// Commit a simulation result if it is still relevant
    ///
    /// Applied only while `patient_id` is active with simulation on. Returns
    /// whether the predictions were updated.
    pub fn commit_simulation(&self, patient_id: &PatientId, predictions: Predictions) -> bool {
        self.state.send_if_modified(|s| {
            let relevant =
                s.simulation.is_simulating && s.active_patient.as_ref() == Some(patient_id);
            if relevant {
                s.predictions = predictions;
                s.prediction_origin = PredictionOrigin::Simulation;
            }
            relevant
        })
    }

    pub fn raise_notice(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
            raised_at: Utc::now(),
        };
        tracing::debug!(level = %notice.level, message = %notice.message, "Notice raised");
        self.state.send_modify(|s| s.notice = Some(notice));
    }

    pub fn dismiss_notice(&self) {
        self.state.send_if_modified(|s| s.notice.take().is_some());
    }

    pub(crate) fn begin_simulation_request(&self) {
        self.state.send_modify(|s| s.simulations_in_flight += 1);
    }

    pub(crate) fn end_simulation_request(&self) {
        self.state
            .send_modify(|s| s.simulations_in_flight = s.simulations_in_flight.saturating_sub(1));
    }
}

impl fmt::Debug for AppStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &*self.state.borrow())
            .finish()
    }
}
