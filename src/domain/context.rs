//! Error context extension trait
//!
//! A counterpart to `anyhow::Context` for `Result<T, CardimaError>`, so
//! library code can add context without giving up the domain error type.
//!
//! # Examples
//!
//! ```rust
//! use cardima::domain::Result;
//! use cardima::domain::context::ResultExt;
//!
//! fn read_ecg(path: &str) -> Result<Vec<u8>> {
//!     std::fs::read(path).with_context(|| format!("Failed to read ECG file {path}"))
//! }
//! ```

use crate::domain::errors::CardimaError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// The context is evaluated eagerly; prefer `.with_context()` when it is
    /// built with `format!`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context computed only if an error occurs
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

/// Works for any error convertible into [`CardimaError`]
///
/// Configuration, validation and authentication errors keep their variant so
/// exit codes still map correctly; everything else becomes `Io` or `Other`.
impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CardimaError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

fn wrap(error: CardimaError, context: impl std::fmt::Display) -> CardimaError {
    match error {
        CardimaError::Configuration(msg) => CardimaError::Configuration(format!("{context}: {msg}")),
        CardimaError::Validation(msg) => CardimaError::Validation(format!("{context}: {msg}")),
        CardimaError::Authentication(msg) => {
            CardimaError::Authentication(format!("{context}: {msg}"))
        }
        CardimaError::Io(msg) => CardimaError::Io(format!("{context}: {msg}")),
        other => CardimaError::Other(format!("{context}: {other}")),
    }
}
