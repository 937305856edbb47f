//! Simulate command implementation
//!
//! Opens a patient, turns the biometric simulator on with the requested age
//! and weight, and waits for the debounced what-if inference to land.

use super::show::print_alert;
use super::{load_context, report_failure};
use crate::adapters::api::ClinicalApi;
use crate::config::CardimaConfig;
use crate::core::registry::RegistryService;
use crate::core::simulation::SimulationTrigger;
use crate::core::store::{AppStore, NoticeLevel, PredictionOrigin, SimulationPatch};
use crate::domain::{Pathology, PatientId, Predictions};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Patient ID
    pub patient_id: PatientId,

    /// Simulated age in years
    #[arg(long)]
    pub age: u32,

    /// Simulated weight in kilograms
    #[arg(long)]
    pub weight: f64,
}

/// How a simulation run ended
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    /// Simulated predictions are on display
    Committed(Predictions),
    /// The request failed; the notice text
    Failed(String),
    /// Nothing arrived in time
    TimedOut,
    /// Shutdown was requested while waiting
    Interrupted,
}

impl SimulateArgs {
    /// Execute the simulate command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let registry = RegistryService::new(ctx.store.clone(), ctx.api.clone());
        let patient = match registry.open_patient(&self.patient_id).await {
            Ok(patient) => patient,
            Err(e) => return Ok(report_failure(&ctx.store, &e)),
        };

        println!("🧪 Simulating {} at age {} / {} kg", patient.name, self.age, self.weight);

        let outcome = run_simulation(
            &ctx.store,
            ctx.api.clone(),
            &ctx.config,
            self.age,
            self.weight,
            shutdown_signal,
        )
        .await;

        let state = ctx.store.snapshot();
        if state.simulation.simulated_age != self.age
            || state.simulation.simulated_weight != self.weight
        {
            println!(
                "   Inputs clamped to age {} / {} kg",
                state.simulation.simulated_age, state.simulation.simulated_weight
            );
        }
        println!();

        match outcome {
            SimulationOutcome::Committed(simulated) => {
                let baseline = state.baseline_predictions.unwrap_or_default();
                print_alert(&simulated, ctx.config.alerts.critical_threshold);
                println!("{:<24} {:>9} {:>10}", "Pathology", "Baseline", "Simulated");
                println!("{}", "-".repeat(45));
                for pathology in Pathology::DISPLAY_ORDER {
                    println!(
                        "{:<24} {:>8.1}% {:>9.1}%",
                        pathology.label(),
                        baseline.get(pathology),
                        simulated.get(pathology)
                    );
                }
                println!();
                Ok(0)
            }
            SimulationOutcome::Failed(message) => {
                println!("❌ {message}");
                Ok(4) // Connection or API error exit code
            }
            SimulationOutcome::TimedOut => {
                println!("❌ No simulation result within the request timeout");
                Ok(4) // Connection or API error exit code
            }
            SimulationOutcome::Interrupted => {
                println!("⚠️  Simulation interrupted");
                Ok(130) // SIGINT exit code (standard Unix convention)
            }
        }
    }
}

/// Drive one simulation through the debounced trigger
///
/// Expects the patient to be loaded in `store`.
pub async fn run_simulation(
    store: &AppStore,
    api: Arc<dyn ClinicalApi>,
    config: &CardimaConfig,
    age: u32,
    weight: f64,
    mut shutdown: watch::Receiver<bool>,
) -> SimulationOutcome {
    store.dismiss_notice();
    let trigger = SimulationTrigger::spawn(store.clone(), api, &config.simulation, shutdown.clone());
    let mut changes = store.subscribe();

    store.set_simulation(SimulationPatch {
        is_simulating: Some(true),
        simulated_age: Some(age),
        simulated_weight: Some(weight),
    });

    let limit = Duration::from_millis(config.simulation.debounce_ms)
        + Duration::from_secs(config.api.timeout_seconds);
    let deadline = tokio::time::sleep(limit);
    tokio::pin!(deadline);
    let mut shutdown_open = true;

    let outcome = loop {
        {
            let state = changes.borrow_and_update();
            if state.prediction_origin == PredictionOrigin::Simulation {
                break SimulationOutcome::Committed(state.predictions);
            }
            if let Some(notice) = state.notice.as_ref().filter(|n| n.level != NoticeLevel::Info) {
                break SimulationOutcome::Failed(notice.message.clone());
            }
        }

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break SimulationOutcome::TimedOut;
                }
            }
            _ = &mut deadline => break SimulationOutcome::TimedOut,
            changed = shutdown.changed(), if shutdown_open => {
                match changed {
                    Ok(()) if *shutdown.borrow() => break SimulationOutcome::Interrupted,
                    Ok(()) => {}
                    Err(_) => shutdown_open = false,
                }
            }
        }
    };

    tracing::debug!(
        requests = trigger.requests_issued(),
        outcome = ?outcome,
        "Simulation run finished"
    );
    trigger.stop().await;
    outcome
}
