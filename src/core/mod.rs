//! Client-side application logic for Cardima.
//!
//! Everything a view needs, without the view: a shared observable store and
//! the workflows that drive it.
//!
//! # Modules
//!
//! - [`store`] - Shared observable application state and its mutators
//! - [`simulation`] - Debounced what-if inference trigger
//! - [`registration`] - Patient intake state machine
//! - [`session`] - Clinician sign-in and sign-out
//! - [`registry`] - Patient list refresh, search, filter and dashboard loading
//! - [`alert`] - Critical alert evaluation
//!
//! # Dashboard Workflow
//!
//! 1. **Sign in**: [`session::SessionService::login`] stores the token
//! 2. **Load registry**: [`registry::RegistryService::refresh_registry`]
//! 3. **Open patient**: [`registry::RegistryService::open_patient`] seeds the
//!    baseline demographics and predictions
//! 4. **Simulate**: flipping `is_simulating` and moving the sliders lets the
//!    [`simulation::SimulationTrigger`] fetch what-if predictions
//! 5. **Alert**: [`alert::CriticalAlert::evaluate`] on whatever is displayed
//!
//! # Example
//!
//! ```rust,no_run
//! use cardima::adapters::api::{ClinicalApi, HttpApiClient};
//! use cardima::adapters::token_storage::FileTokenStorage;
//! use cardima::config::load_config;
//! use cardima::core::alert::CriticalAlert;
//! use cardima::core::registry::RegistryService;
//! use cardima::core::store::AppStore;
//! use cardima::domain::PatientId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cardima.toml")?;
//! let api: Arc<dyn ClinicalApi> = Arc::new(HttpApiClient::new(&config.api)?);
//! let store = AppStore::new(Arc::new(FileTokenStorage::new(&config.session.token_path)));
//!
//! let registry = RegistryService::new(store.clone(), api);
//! registry.open_patient(&PatientId::new("65f1c2a9e4b0a1b2c3d4e5f6")?).await?;
//!
//! let predictions = store.read(|s| s.predictions);
//! if let Some(alert) = CriticalAlert::evaluate(&predictions, config.alerts.critical_threshold) {
//!     println!("{alert}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod registration;
pub mod registry;
pub mod session;
pub mod simulation;
pub mod store;
