//! Result type alias for Cardima
//!
//! This module provides a convenient Result type alias that uses CardimaError
//! as the error type.

use super::errors::CardimaError;

/// Result type alias for Cardima operations
///
/// # Examples
///
/// ```
/// use cardima::domain::result::Result;
/// use cardima::domain::errors::CardimaError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CardimaError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CardimaError>;
