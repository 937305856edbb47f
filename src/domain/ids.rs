//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers the clinical API hands out.
//! Each type keeps patient and clinician ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient identifier newtype wrapper
///
/// The API's opaque record id (`_id` on the wire).
///
/// # Examples
///
/// ```
/// use cardima::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("65f1c2a9e4b0a1b2c3d4e5f6").unwrap();
/// assert_eq!(id.as_str(), "65f1c2a9e4b0a1b2c3d4e5f6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Short code shown in the registry table
    ///
    /// Takes the last 12 characters, groups them in blocks of four joined by
    /// `-` and uppercases the result.
    ///
    /// ```
    /// use cardima::domain::ids::PatientId;
    ///
    /// let id = PatientId::new("65f1c2a9e4b0a1b2c3d4e5f6").unwrap();
    /// assert_eq!(id.display_code(), "A1B2-C3D4-E5F6");
    /// ```
    pub fn display_code(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let tail = &chars[chars.len().saturating_sub(12)..];
        tail.chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-")
            .to_uppercase()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Doctor identifier newtype wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoctorId(String);

impl DoctorId {
    /// Creates a new DoctorId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Doctor ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the doctor ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DoctorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Medical record number
///
/// Client-generated at registration time as `P-<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mrn(String);

impl Mrn {
    /// Creates a new Mrn from a string
    pub fn new(mrn: impl Into<String>) -> Result<Self, String> {
        let mrn = mrn.into();
        if mrn.trim().is_empty() {
            return Err("MRN cannot be empty".to_string());
        }
        Ok(Self(mrn))
    }

    /// Generates a random registration MRN in the `P-0`..`P-99999` range
    pub fn generate() -> Self {
        use rand::Rng;
        let n: u32 = rand::thread_rng().gen_range(0..100_000);
        Self(format!("P-{n}"))
    }

    /// Returns the MRN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
