//! CLI command implementations
//!
//! This module contains all CLI command implementations plus the wiring they
//! share: loading the configuration, building the API client and store, and
//! mapping errors onto exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Invalid input |
//! | 2 | Configuration error |
//! | 3 | Not signed in, or credentials rejected |
//! | 4 | Connection or API error |
//! | 5 | Fatal error |

pub mod init;
pub mod login;
pub mod logout;
pub mod patients;
pub mod register;
pub mod show;
pub mod signal;
pub mod simulate;
pub mod validate;

use crate::adapters::api::{ClinicalApi, HttpApiClient};
use crate::adapters::token_storage::FileTokenStorage;
use crate::config::{load_config, CardimaConfig};
use crate::core::store::AppStore;
use crate::domain::{ApiError, CardimaError, Result};
use std::sync::Arc;

/// Configuration, store and API client for one command run
pub struct CommandContext {
    pub config: CardimaConfig,
    pub store: AppStore,
    pub api: Arc<dyn ClinicalApi>,
}

impl CommandContext {
    /// Load `config_path` and wire up the store and HTTP client
    pub fn load(config_path: &str) -> Result<Self> {
        let config = load_config(config_path)?;
        Self::from_config(config)
    }

    pub fn from_config(config: CardimaConfig) -> Result<Self> {
        let api: Arc<dyn ClinicalApi> = Arc::new(HttpApiClient::new(&config.api)?);
        let storage = Arc::new(FileTokenStorage::new(&config.session.token_path));
        let store = AppStore::new(storage).with_simulation_limits(config.simulation.clone());

        tracing::debug!(base_url = %api.base_url(), "Command context ready");
        Ok(Self { config, store, api })
    }
}

/// Exit code for a failed operation
pub fn exit_code_for(error: &CardimaError) -> i32 {
    match error {
        CardimaError::Validation(_) => 1,
        CardimaError::Configuration(_) => 2,
        CardimaError::Authentication(_) | CardimaError::Api(ApiError::AuthenticationFailed(_)) => {
            3
        }
        CardimaError::Api(_) => 4,
        _ => 5,
    }
}

/// Load the context, or print why not and return the exit code
pub(crate) fn load_context(config_path: &str) -> std::result::Result<CommandContext, i32> {
    CommandContext::load(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        exit_code_for(&e)
    })
}

/// Print a failed operation the way the notice banner would show it
pub(crate) fn report_failure(store: &AppStore, error: &CardimaError) -> i32 {
    let notice = store.read(|s| s.notice.clone());
    match notice {
        Some(notice) => println!("❌ {}", notice.message),
        None => println!("❌ {}", error.notice_message("Request failed")),
    }
    println!("   Error: {error}");
    exit_code_for(error)
}
