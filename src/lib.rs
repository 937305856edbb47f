// Cardima - ECG Diagnostics Client
// Copyright (c) 2025 Cardima Contributors
// Licensed under the MIT License

//! # Cardima - ECG Diagnostics Client
//!
//! Cardima is the headless client state of a clinical ECG dashboard. It talks
//! to the Cardima diagnostics API and keeps everything a dashboard renders in
//! one observable store.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Signing in** clinicians and persisting the session token
//! - **Browsing** the patient registry with search, risk filter and urgency sort
//! - **Registering** patients with an ECG upload and an AI follow-up checklist
//! - **Simulating** what-if predictions for a different age and weight,
//!   debounced and immune to out-of-order responses
//! - **Alerting** on critical MI or conduction disturbance probabilities
//!
//! ## Architecture
//!
//! Cardima follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Store and workflows (simulation, registration, session, registry, alert)
//! - [`adapters`] - External integrations (clinical API, token storage)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardima::adapters::api::{ClinicalApi, HttpApiClient};
//! use cardima::adapters::token_storage::FileTokenStorage;
//! use cardima::config::{load_config, secret_string};
//! use cardima::core::registry::{RegistryQuery, RegistryService, RiskFilter};
//! use cardima::core::session::SessionService;
//! use cardima::core::store::AppStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cardima.toml")?;
//!     let api: Arc<dyn ClinicalApi> = Arc::new(HttpApiClient::new(&config.api)?);
//!     let store = AppStore::new(Arc::new(FileTokenStorage::new(&config.session.token_path)));
//!
//!     SessionService::new(store.clone(), api.clone())
//!         .login("doctor@hospital.org", secret_string("password".to_string()))
//!         .await?;
//!
//!     RegistryService::new(store.clone(), api).refresh_registry().await?;
//!
//!     let query = RegistryQuery {
//!         search: String::new(),
//!         filter: RiskFilter::HighRisk,
//!     };
//!     let patients = store.read(|s| s.patients.clone());
//!     for patient in query.apply(&patients) {
//!         println!("{} {}", patient.name, patient.status_label());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Observing State
//!
//! Every mutation goes through [`core::store::AppStore`], which publishes the
//! new [`core::store::AppState`] on a `tokio::sync::watch` channel:
//!
//! ```rust,no_run
//! use cardima::adapters::token_storage::MemoryTokenStorage;
//! use cardima::core::store::AppStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store = AppStore::new(Arc::new(MemoryTokenStorage::new()));
//! let mut changes = store.subscribe();
//! while changes.changed().await.is_ok() {
//!     let state = changes.borrow_and_update();
//!     println!("predictions: {:?}", state.predictions);
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Cardima uses the [`domain::CardimaError`] type for all errors:
//!
//! ```rust,no_run
//! use cardima::domain::CardimaError;
//!
//! fn example() -> Result<(), CardimaError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = cardima::config::load_config("cardima.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Cardima uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(patient_id = "65f1c2a9e4b0a1b2c3d4e5f6", "Loading patient");
//! warn!(status = 502, "Simulation request failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
