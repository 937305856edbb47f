//! Doctor domain model
//!
//! Read-only projection of the authenticated clinician, supplied by the API
//! at login time.

use super::ids::DoctorId;
use serde::{Deserialize, Serialize};

/// The clinician behind the current session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Clinician identifier
    #[serde(alias = "_id")]
    pub id: DoctorId,

    /// Display name
    pub name: String,

    /// Login email
    #[serde(default)]
    pub email: String,

    /// Hospital the clinician belongs to
    #[serde(default)]
    pub hospital_id: String,
}
