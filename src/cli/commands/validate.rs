//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Cardima configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  API: {}", config.api.base_url);
        println!("  Request Timeout: {}s", config.api.timeout_seconds);
        println!("  TLS Verify: {}", config.api.tls_verify);
        println!(
            "  Login Email: {}",
            config.api.email.as_deref().unwrap_or("(not set)")
        );
        println!(
            "  Login Password: {}",
            if config.api.password.is_some() {
                "(set)"
            } else {
                "(not set)"
            }
        );
        println!("  Session Token File: {}", config.session.token_path);
        println!("  Simulation Debounce: {}ms", config.simulation.debounce_ms);
        println!(
            "  Simulated Age Range: {}-{}",
            config.simulation.min_age, config.simulation.max_age
        );
        println!(
            "  Simulated Weight Range: {}-{} kg",
            config.simulation.min_weight, config.simulation.max_weight
        );
        println!(
            "  Critical Alert Threshold: {}%",
            config.alerts.critical_threshold
        );
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
