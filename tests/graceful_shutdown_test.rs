//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals reach every receiver
//! - The simulation trigger stops on the shutdown signal
//! - Requests cut off by shutdown never touch the predictions

use cardima::adapters::api::ScriptedApi;
use cardima::adapters::token_storage::MemoryTokenStorage;
use cardima::config::SimulationConfig;
use cardima::core::simulation::SimulationTrigger;
use cardima::core::store::{AppStore, PredictionOrigin, SimulationPatch};
use cardima::domain::{DiagnosticProbabilities, Patient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn store_with_patient() -> AppStore {
    let store = AppStore::new(Arc::new(MemoryTokenStorage::with_token("tok1")));
    let patient: Patient = serde_json::from_value(serde_json::json!({
        "_id": "p1",
        "name": "Ada Stone",
        "demographics": {"age": 58, "sex": "F", "height": 168, "weight": 74},
        "diagnostic_probabilities": {"NORM": 0.7, "MI": 0.1}
    }))
    .unwrap();
    store.load_patient(&patient);
    store
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    // Test that shutdown signal propagates to multiple receivers
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test(start_paused = true)]
async fn test_trigger_stops_on_shutdown_signal() {
    let store = store_with_patient();
    let api = Arc::new(ScriptedApi::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let trigger =
        SimulationTrigger::spawn(store, api, &SimulationConfig::default(), shutdown_rx);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!trigger.is_finished());

    shutdown_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(trigger.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_false_signal_keeps_trigger_running() {
    let store = store_with_patient();
    let api = Arc::new(ScriptedApi::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let trigger =
        SimulationTrigger::spawn(store, api, &SimulationConfig::default(), shutdown_rx);
    shutdown_tx.send(false).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!trigger.is_finished());

    // Dropping the sender alone does not stop the trigger
    drop(shutdown_tx);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!trigger.is_finished());

    trigger.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_discards_in_flight_request() {
    let store = store_with_patient();
    let api = Arc::new(ScriptedApi::new());
    api.push_simulation(
        Duration::from_secs(2),
        Ok(DiagnosticProbabilities {
            mi: 0.99,
            ..Default::default()
        }),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let trigger = SimulationTrigger::spawn(
        store.clone(),
        api.clone(),
        &SimulationConfig::default(),
        shutdown_rx,
    );

    store.set_simulation(SimulationPatch {
        is_simulating: Some(true),
        simulated_age: Some(80),
        ..Default::default()
    });
    let before = store.read(|s| s.predictions);

    // Past the debounce, request outstanding
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(api.simulation_requests().len(), 1);
    assert_eq!(store.read(|s| s.simulations_in_flight), 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(trigger.is_finished());
    let state = store.snapshot();
    assert_eq!(state.predictions, before);
    assert_eq!(state.prediction_origin, PredictionOrigin::Baseline);
    assert_eq!(state.simulations_in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_waits_for_trigger() {
    let store = store_with_patient();
    let api = Arc::new(ScriptedApi::new());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let trigger = SimulationTrigger::spawn(
        store.clone(),
        api.clone(),
        &SimulationConfig::default(),
        shutdown_rx,
    );
    trigger.stop().await;

    // Nothing listens any more
    store.set_simulation(SimulationPatch {
        is_simulating: Some(true),
        simulated_age: Some(80),
        ..Default::default()
    });
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(api.simulation_requests().is_empty());
}
