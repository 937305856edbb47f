//! Clinical API adapter
//!
//! This module provides the integration with the clinical REST backend: the
//! [`ClinicalApi`] trait, its reqwest implementation, the wire models and a
//! scripted in-process implementation for tests and offline demos.

pub mod client;
pub mod models;
pub mod scripted;
pub mod traits;

pub use client::HttpApiClient;
pub use models::{
    ChecklistAnswer, ChecklistOutcome, ChecklistSubmission, EcgAttachment, LoginRequest,
    LoginResponse, PatientRegistration, SimulationRequest,
};
pub use scripted::{ApiCall, ScriptedApi};
pub use traits::ClinicalApi;
