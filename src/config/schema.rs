//! Configuration schema types
//!
//! This module defines the configuration structure for Cardima.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Cardima configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CardimaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Clinical API connection
    pub api: ApiConfig,

    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,

    /// Biometric simulator settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Patient registration workflow settings
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Critical alert settings
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CardimaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate(&self.environment)?;
        self.session.validate()?;
        self.simulation.validate()?;
        self.alerts.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Clinical API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `https://cardima.example.org/api`
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes patient data to
    /// man-in-the-middle attacks and should ONLY be used against local
    /// development servers. Rejected in **production** environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Login email used when none is passed on the command line
    #[serde(default)]
    pub email: Option<String>,

    /// Login password (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl ApiConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("api.base_url '{}' is not a valid URL", self.base_url));
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production (api.tls_verify)"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            email: None,
            password: None,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the access token between runs
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl SessionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.token_path.trim().is_empty() {
            return Err("session.token_path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

/// Biometric simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Quiet period before a what-if inference request is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Lowest simulated age in years
    #[serde(default = "default_min_age")]
    pub min_age: u32,

    /// Highest simulated age in years
    #[serde(default = "default_max_age")]
    pub max_age: u32,

    /// Lowest simulated weight in kilograms
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,

    /// Highest simulated weight in kilograms
    #[serde(default = "default_max_weight")]
    pub max_weight: f64,
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("simulation.debounce_ms must be > 0".to_string());
        }
        if self.min_age > self.max_age {
            return Err(format!(
                "simulation.min_age ({}) must not exceed simulation.max_age ({})",
                self.min_age, self.max_age
            ));
        }
        if !self.min_weight.is_finite()
            || !self.max_weight.is_finite()
            || self.min_weight <= 0.0
            || self.min_weight > self.max_weight
        {
            return Err(format!(
                "simulation weight range [{}, {}] is invalid",
                self.min_weight, self.max_weight
            ));
        }
        Ok(())
    }

    /// Clamps a simulated age into the slider range
    pub fn clamp_age(&self, age: u32) -> u32 {
        age.clamp(self.min_age, self.max_age)
    }

    /// Clamps a simulated weight into the slider range
    pub fn clamp_weight(&self, weight: f64) -> f64 {
        weight.clamp(self.min_weight, self.max_weight)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_age: default_min_age(),
            max_age: default_max_age(),
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
        }
    }
}

/// Registration workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// How long the success screen stays up before the form resets
    #[serde(default = "default_success_dwell_ms")]
    pub success_dwell_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            success_dwell_ms: default_success_dwell_ms(),
        }
    }
}

/// Critical alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Percentage above which MI or CD raises the emergency banner
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
}

impl AlertConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.critical_threshold > 0.0 && self.critical_threshold <= 100.0) {
            return Err(format!(
                "alerts.critical_threshold must be in (0, 100], got {}",
                self.critical_threshold
            ));
        }
        Ok(())
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_critical_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_token_path() -> String {
    ".cardima/session_token".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_min_age() -> u32 {
    18
}

fn default_max_age() -> u32 {
    100
}

fn default_min_weight() -> f64 {
    40.0
}

fn default_max_weight() -> f64 {
    150.0
}

fn default_success_dwell_ms() -> u64 {
    1200
}

fn default_critical_threshold() -> f64 {
    90.0
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
