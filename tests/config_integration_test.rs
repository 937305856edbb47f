//! Integration tests for configuration loading and validation
//!
//! Every test takes `ENV_MUTEX` because loading applies `CARDIMA_*`
//! environment overrides.

use cardima::config::{load_config, Environment};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that read or modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("CARDIMA_APPLICATION_LOG_LEVEL");
    std::env::remove_var("CARDIMA_API_BASE_URL");
    std::env::remove_var("CARDIMA_API_TIMEOUT_SECONDS");
    std::env::remove_var("CARDIMA_API_PASSWORD");
    std::env::remove_var("CARDIMA_SIMULATION_DEBOUNCE_MS");
    std::env::remove_var("CARDIMA_ALERTS_CRITICAL_THRESHOLD");
    std::env::remove_var("TEST_CARDIMA_PASSWORD");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "staging"

[application]
log_level = "debug"

[api]
base_url = "https://cardima.example.org/api"
timeout_seconds = 10
tls_verify = true
email = "grey@cardima.ai"
password = "hunter2"

[session]
token_path = "/tmp/cardima/token"

[simulation]
debounce_ms = 250
min_age = 20
max_age = 90
min_weight = 45.0
max_weight = 140.0

[registration]
success_dwell_ms = 800

[alerts]
critical_threshold = 85.0

[logging]
local_enabled = true
local_path = "/tmp/cardima/logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.api.base_url, "https://cardima.example.org/api");
    assert_eq!(config.api.timeout_seconds, 10);
    assert_eq!(config.api.email.as_deref(), Some("grey@cardima.ai"));
    let password: &str = config.api.password.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(password, "hunter2");
    assert_eq!(config.session.token_path, "/tmp/cardima/token");
    assert_eq!(config.simulation.debounce_ms, 250);
    assert_eq!(config.simulation.clamp_age(10), 20);
    assert_eq!(config.simulation.clamp_weight(200.0), 140.0);
    assert_eq!(config.registration.success_dwell_ms, 800);
    assert_eq!(config.alerts.critical_threshold, 85.0);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[api]\nbase_url = \"http://localhost:3000/api\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.api.timeout_seconds, 30);
    assert!(config.api.tls_verify);
    assert!(config.api.password.is_none());
    assert_eq!(config.session.token_path, ".cardima/session_token");
    assert_eq!(config.simulation.debounce_ms, 500);
    assert_eq!(config.simulation.min_age, 18);
    assert_eq!(config.simulation.max_age, 100);
    assert_eq!(config.simulation.min_weight, 40.0);
    assert_eq!(config.simulation.max_weight, 150.0);
    assert_eq!(config.registration.success_dwell_ms, 1200);
    assert_eq!(config.alerts.critical_threshold, 90.0);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_nan_weight_range_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:3000/api"

[simulation]
min_weight = nan
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("weight range"));
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_CARDIMA_PASSWORD", "from-env");

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:3000/api"
password = "${TEST_CARDIMA_PASSWORD}"
"#,
    );
    let config = load_config(file.path()).unwrap();

    let password: &str = config.api.password.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(password, "from-env");
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:3000/api"
password = "${TEST_CARDIMA_PASSWORD}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_CARDIMA_PASSWORD"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("CARDIMA_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("CARDIMA_API_BASE_URL", "https://override.example.org/api");
    std::env::set_var("CARDIMA_SIMULATION_DEBOUNCE_MS", "750");
    std::env::set_var("CARDIMA_ALERTS_CRITICAL_THRESHOLD", "not-a-number");

    let file = write_config("[api]\nbase_url = \"http://localhost:3000/api\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.api.base_url, "https://override.example.org/api");
    assert_eq!(config.simulation.debounce_ms, 750);
    // Unparseable numbers are ignored
    assert_eq!(config.alerts.critical_threshold, 90.0);

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        "[api]\nbase_url = \"ftp://cardima.example.org\"\n",
        "[api]\nbase_url = \"http://localhost:3000/api\"\ntimeout_seconds = 0\n",
        "[api]\nbase_url = \"http://localhost:3000/api\"\n[simulation]\ndebounce_ms = 0\n",
        "[api]\nbase_url = \"http://localhost:3000/api\"\n[alerts]\ncritical_threshold = 120.0\n",
        "[application]\nlog_level = \"verbose\"\n[api]\nbase_url = \"http://localhost:3000/api\"\n",
        "environment = \"production\"\n[api]\nbase_url = \"https://cardima.example.org\"\ntls_verify = false\n",
    ];

    for contents in cases {
        let file = write_config(contents);
        let result = load_config(file.path());
        assert!(result.is_err(), "expected rejection of:\n{contents}");
    }
}

#[test]
fn test_missing_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let err = load_config("/nonexistent/cardima.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
