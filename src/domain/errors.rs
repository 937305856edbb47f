//! Domain error types
//!
//! This module defines the error hierarchy for Cardima.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Cardima error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CardimaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors returned by the clinical API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// No active session, or the session was rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Workflow or store state errors
    #[error("State error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CardimaError {
    /// Text shown to the clinician in the transient notice banner.
    ///
    /// Server-supplied messages win; everything else falls back to `fallback`.
    pub fn notice_message(&self, fallback: &str) -> String {
        match self {
            CardimaError::Validation(msg) => msg.clone(),
            CardimaError::Api(ApiError::AuthenticationFailed(message))
            | CardimaError::Api(ApiError::ClientError { message, .. })
            | CardimaError::Api(ApiError::ServerError { message, .. })
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// Clinical API errors
///
/// Errors that occur when talking to the remote API.
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to reach the API
    #[error("Failed to connect to API: {0}")]
    ConnectionFailed(String),

    /// Credentials or token rejected (401/403), with the server's message if any
    #[error("Authentication failed{}", detail(.0))]
    AuthenticationFailed(String),

    /// Response body did not match the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Patient not found
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Client error (4xx), with the server's message if any
    #[error("Client error: {status}{}", detail(.message))]
    ClientError { status: u16, message: String },

    /// Server error (5xx), with the server's message if any
    #[error("Server error: {status}{}", detail(.message))]
    ServerError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CardimaError {
    fn from(err: std::io::Error) -> Self {
        CardimaError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CardimaError {
    fn from(err: serde_json::Error) -> Self {
        CardimaError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CardimaError {
    fn from(err: toml::de::Error) -> Self {
        CardimaError::Configuration(format!("TOML parse error: {err}"))
    }
}
