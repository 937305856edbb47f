//! Configuration management for Cardima.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Cardima uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CARDIMA_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cardima::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cardima.toml")?;
//!
//! println!("API: {}", config.api.base_url);
//! println!("Debounce: {} ms", config.simulation.debounce_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ApiConfig`] - API base URL, timeout, TLS, optional login credentials
//! - [`SessionConfig`] - Where the access token is persisted
//! - [`SimulationConfig`] - Debounce window and slider ranges
//! - [`RegistrationConfig`] - Success-screen dwell time
//! - [`AlertConfig`] - Critical alert threshold
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://cardima.example.org/api"
//! email = "doctor@hospital.org"
//! password = "${CARDIMA_PASSWORD}"
//!
//! [simulation]
//! debounce_ms = 500
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AlertConfig, ApiConfig, ApplicationConfig, CardimaConfig, Environment, LoggingConfig,
    RegistrationConfig, SessionConfig, SimulationConfig,
};
pub use secret::{secret_string, session_token, SecretString, SecretValue};
