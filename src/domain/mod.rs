//! Domain models and types for Cardima.
//!
//! This module contains the core domain models and types shared by the store,
//! the API adapter and the CLI.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`DoctorId`], [`Mrn`])
//! - **Domain models** ([`Patient`], [`Doctor`], [`EcgSignal`])
//! - **Diagnostic values** ([`DiagnosticProbabilities`] in `[0, 1]`,
//!   [`Predictions`] in percent)
//! - **Error types** ([`CardimaError`], [`ApiError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use cardima::domain::{PatientId, DoctorId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient_id = PatientId::new("65f1c2a9e4b0a1b2c3d4e5f6")?;
//! let doctor_id = DoctorId::new("d1")?;
//!
//! // This won't compile - ids are distinct types
//! // let wrong: PatientId = doctor_id;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod doctor;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod predictions;
pub mod result;
pub mod signal;

// Re-export commonly used types for convenience
pub use doctor::Doctor;
pub use errors::{ApiError, CardimaError};
pub use ids::{DoctorId, Mrn, PatientId};
pub use patient::{AiAnalysis, ChecklistItem, Demographics, Patient, RiskLevel, Sex};
pub use predictions::{DiagnosticProbabilities, Pathology, Predictions, PredictionsPatch};
pub use result::Result;
pub use signal::{EcgSignal, LeadSummary};
