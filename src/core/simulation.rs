//! Debounced biometric simulation trigger
//!
//! Watches the store for changes to the active patient and the simulator
//! controls, waits for a quiet period, then asks the API for what-if
//! probabilities. Pipeline: combine latest → debounce → guard → request →
//! commit.
//!
//! Each request is stamped with a generation number. A response is committed
//! only if no newer request has been issued since and the store still shows
//! the same patient with simulation on; anything else is dropped.

use crate::adapters::api::{ClinicalApi, SimulationRequest};
use crate::config::SimulationConfig;
use crate::core::store::{AppState, AppStore, NoticeLevel};
use crate::domain::{PatientId, Predictions};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

const SIMULATION_FAILED: &str = "Simulation failed. Showing the last known predictions.";

/// The inputs a simulation request depends on
#[derive(Debug, Clone, PartialEq)]
struct SimulationKey {
    patient_id: Option<PatientId>,
    is_simulating: bool,
    age: u32,
    weight: f64,
    resets: u64,
}

impl SimulationKey {
    fn from_state(state: &AppState) -> Self {
        Self {
            patient_id: state.active_patient.clone(),
            is_simulating: state.simulation.is_simulating,
            age: state.simulation.simulated_age,
            weight: state.simulation.simulated_weight,
            resets: state.simulation_resets,
        }
    }

    /// The request to send, or `None` while the trigger is inert
    fn request(&self) -> Option<SimulationRequest> {
        if !self.is_simulating {
            return None;
        }
        let patient_id = self.patient_id.clone()?;
        Some(SimulationRequest {
            patient_id,
            weight: self.weight,
            age: self.age,
        })
    }
}

/// Handle to the running trigger task
///
/// Dropping the handle stops the trigger and abandons requests in flight.
///
/// # Example
///
/// ```rust,no_run
/// use cardima::adapters::api::{ClinicalApi, HttpApiClient};
/// use cardima::adapters::token_storage::FileTokenStorage;
/// use cardima::config::{ApiConfig, SimulationConfig};
/// use cardima::core::simulation::SimulationTrigger;
/// use cardima::core::store::AppStore;
/// use std::sync::Arc;
///
/// # async fn example() -> cardima::domain::Result<()> {
/// let api: Arc<dyn ClinicalApi> = Arc::new(HttpApiClient::new(&ApiConfig::default())?);
/// let store = AppStore::new(Arc::new(FileTokenStorage::new(".cardima/session_token")));
/// let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
///
/// let trigger = SimulationTrigger::spawn(
///     store.clone(),
///     api,
///     &SimulationConfig::default(),
///     shutdown_rx,
/// );
/// # drop(trigger);
/// # Ok(())
/// # }
/// ```
pub struct SimulationTrigger {
    handle: JoinHandle<()>,
    generation: Arc<AtomicU64>,
}

impl SimulationTrigger {
    /// Start watching `store`
    ///
    /// The trigger stops when `shutdown` flips to `true`.
    pub fn spawn(
        store: AppStore,
        api: Arc<dyn ClinicalApi>,
        config: &SimulationConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        // Snapshot now so changes made right after spawn are not missed
        let mut changes = store.subscribe();
        let initial = SimulationKey::from_state(&changes.borrow_and_update());
        let worker = TriggerWorker {
            store,
            api,
            debounce: Duration::from_millis(config.debounce_ms),
            generation: generation.clone(),
            last_failed: Arc::new(AtomicU64::new(0)),
        };
        let handle = tokio::spawn(worker.run(changes, initial, shutdown));

        Self { handle, generation }
    }

    /// Number of requests issued so far
    pub fn requests_issued(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the trigger and wait for it to wind down
    pub async fn stop(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for SimulationTrigger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Counts a request as in flight until dropped, including on abort
struct PendingRequest(AppStore);

impl Drop for PendingRequest {
    fn drop(&mut self) {
        self.0.end_simulation_request();
    }
}

struct TriggerWorker {
    store: AppStore,
    api: Arc<dyn ClinicalApi>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    /// Generation of the most recent failed request, 0 if none
    last_failed: Arc<AtomicU64>,
}

impl TriggerWorker {
    async fn run(
        self,
        mut changes: watch::Receiver<AppState>,
        initial: SimulationKey,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut current = initial;
        // Key and generation of the last request
        let mut last_sent: Option<(SimulationKey, u64)> = None;
        let mut deadline: Option<Instant> = None;
        let mut in_flight = JoinSet::new();
        let mut shutdown_open = true;

        tracing::debug!(debounce_ms = self.debounce.as_millis() as u64, "Simulation trigger started");

        loop {
            let quiet_until = deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = SimulationKey::from_state(&changes.borrow_and_update());
                    if next != current {
                        current = next;
                        // Inert inputs cancel any pending request
                        deadline = current.request().map(|_| Instant::now() + self.debounce);
                    }
                }
                _ = tokio::time::sleep_until(quiet_until), if deadline.is_some() => {
                    deadline = None;
                    let answered = matches!(
                        &last_sent,
                        Some((key, generation))
                            if *key == current
                                && self.last_failed.load(Ordering::SeqCst) != *generation
                    );
                    if !answered {
                        if let Some(request) = current.request() {
                            if let Some(generation) = self.dispatch(request, &mut in_flight) {
                                last_sent = Some((current.clone(), generation));
                            }
                        }
                    }
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                changed = shutdown.changed(), if shutdown_open => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => {
                            tracing::info!("Shutdown requested, stopping simulation trigger");
                            break;
                        }
                        Ok(()) => {}
                        Err(_) => shutdown_open = false,
                    }
                }
            }
        }

        in_flight.abort_all();
    }

    /// Issue `request`; returns its generation, or `None` without a session
    fn dispatch(&self, request: SimulationRequest, in_flight: &mut JoinSet<()>) -> Option<u64> {
        let Some(token) = self.store.token() else {
            tracing::warn!("Simulation skipped: no active session");
            self.store
                .raise_notice(NoticeLevel::Warning, "Sign in to run simulations.");
            return None;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = self.generation.clone();
        let last_failed = self.last_failed.clone();
        let store = self.store.clone();
        let api = self.api.clone();

        tracing::debug!(
            patient_id = %request.patient_id,
            age = request.age,
            weight = request.weight,
            generation,
            "Sending simulation request"
        );

        store.begin_simulation_request();
        let pending = PendingRequest(store.clone());
        in_flight.spawn(async move {
            let result = api.simulate(&token, &request).await;
            drop(pending);
            if result.is_err() {
                last_failed.fetch_max(generation, Ordering::SeqCst);
            }

            let newest = latest.load(Ordering::SeqCst);
            match result {
                Ok(probabilities) => {
                    if generation != newest {
                        crate::log_stale_response!(request.patient_id, generation, newest);
                        return;
                    }
                    let predictions = Predictions::from_probabilities(&probabilities);
                    if store.commit_simulation(&request.patient_id, predictions) {
                        tracing::debug!(
                            patient_id = %request.patient_id,
                            generation,
                            "Simulation predictions committed"
                        );
                    } else {
                        crate::log_stale_response!(request.patient_id, generation, newest);
                    }
                }
                Err(e) if generation == newest => {
                    tracing::warn!(
                        patient_id = %request.patient_id,
                        error = %e,
                        "Simulation request failed"
                    );
                    store.raise_notice(NoticeLevel::Warning, e.notice_message(SIMULATION_FAILED));
                }
                Err(e) => {
                    tracing::debug!(error = %e, generation, "Superseded simulation request failed");
                }
            }
        });

        Some(generation)
    }
}
