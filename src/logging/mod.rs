//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - Local JSON file logging with daily or hourly rotation
//! - Helper macros for API calls and discarded simulation responses
//!
//! # Example
//!
//! ```no_run
//! use cardima::logging::init_logging;
//! use cardima::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Client started");
//! tracing::warn!(patient_id = "p1", "Simulation request failed");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a completed API round-trip
///
/// # Example
///
/// ```no_run
/// use cardima::log_api_call;
///
/// log_api_call!("list_patients", 200u16, 42u128);
/// ```
#[macro_export]
macro_rules! log_api_call {
    ($operation:expr, $status:expr, $duration_ms:expr) => {
        ::tracing::debug!(
            operation = $operation,
            status = $status,
            duration_ms = $duration_ms as u64,
            "API call completed"
        );
    };
}

/// Log a simulation response that arrived too late to be shown
///
/// # Example
///
/// ```no_run
/// use cardima::log_stale_response;
///
/// log_stale_response!("p1", 3u64, 5u64);
/// ```
#[macro_export]
macro_rules! log_stale_response {
    ($patient_id:expr, $generation:expr, $latest:expr) => {
        ::tracing::debug!(
            patient_id = %$patient_id,
            generation = $generation,
            latest_generation = $latest,
            "Discarding stale simulation response"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cardima::log_error_with_context;
/// use cardima::domain::CardimaError;
///
/// let error = CardimaError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        ::tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
