//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cardima.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Cardima configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set api.base_url in {} to your Cardima API", self.output);
                println!("  2. Optionally export CARDIMA_API_EMAIL and CARDIMA_API_PASSWORD");
                println!("  3. Validate configuration: cardima validate-config");
                println!("  4. Sign in: cardima login");
                println!("  5. Browse patients: cardima patients");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Cardima Configuration File
# Headless client for the Cardima ECG diagnostics API

environment = "development"

[application]
log_level = "info"

[api]
base_url = "http://localhost:3000/api"
timeout_seconds = 30
tls_verify = true

[session]
token_path = ".cardima/session_token"

[simulation]
debounce_ms = 500

[alerts]
critical_threshold = 90.0

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Cardima Configuration File
# Headless client for the Cardima ECG diagnostics API
#
# Values of the form ${VAR} are read from the environment (a .env file in the
# working directory is loaded first). Any setting can also be overridden with
# CARDIMA_<SECTION>_<KEY>, e.g. CARDIMA_API_BASE_URL.

# ============================================================================
# Environment
# ============================================================================
# development | staging | production
# TLS verification cannot be disabled in production.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Clinical API
# ============================================================================
[api]
# Base URL of the API (http:// or https://)
base_url = "http://localhost:3000/api"

# Request timeout in seconds
timeout_seconds = 30

# TLS certificate verification
tls_verify = true

# Default login credentials for `cardima login` (optional)
# email = "doctor@hospital.org"
# password = "${CARDIMA_PASSWORD}"

# ============================================================================
# Session
# ============================================================================
[session]
# File holding the access token between runs
token_path = ".cardima/session_token"

# ============================================================================
# Biometric Simulator
# ============================================================================
[simulation]
# Quiet period before a what-if request is sent
debounce_ms = 500

# Slider ranges; simulated values are clamped into them
min_age = 18
max_age = 100
min_weight = 40.0
max_weight = 150.0

# ============================================================================
# Patient Registration
# ============================================================================
[registration]
# How long the success screen stays up before the form resets
success_dwell_ms = 1200

# ============================================================================
# Critical Alerts
# ============================================================================
[alerts]
# MI or CD percentage above which the emergency banner is shown
critical_threshold = 90.0

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}
