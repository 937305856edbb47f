//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CardimaConfig;
use super::secret::secret_string;
use crate::domain::errors::CardimaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CardimaConfig
/// 4. Applies environment variable overrides (CARDIMA_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use cardima::config::loader::load_config;
///
/// let config = load_config("cardima.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CardimaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CardimaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CardimaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CardimaConfig = toml::from_str(&contents)
        .map_err(|e| CardimaError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        CardimaError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CardimaError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CardimaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using CARDIMA_* prefix
///
/// Environment variables follow the pattern: CARDIMA_<SECTION>_<KEY>,
/// e.g. CARDIMA_API_BASE_URL, CARDIMA_SIMULATION_DEBOUNCE_MS.
/// Unparseable numeric values are ignored.
fn apply_env_overrides(config: &mut CardimaConfig) {
    if let Ok(val) = std::env::var("CARDIMA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // API overrides
    if let Ok(val) = std::env::var("CARDIMA_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CARDIMA_API_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("CARDIMA_API_TLS_VERIFY") {
        config.api.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CARDIMA_API_EMAIL") {
        config.api.email = Some(val);
    }
    if let Ok(val) = std::env::var("CARDIMA_API_PASSWORD") {
        config.api.password = Some(secret_string(val));
    }

    if let Ok(val) = std::env::var("CARDIMA_SESSION_TOKEN_PATH") {
        config.session.token_path = val;
    }

    // Simulation overrides
    if let Ok(val) = std::env::var("CARDIMA_SIMULATION_DEBOUNCE_MS") {
        if let Ok(ms) = val.parse() {
            config.simulation.debounce_ms = ms;
        }
    }

    if let Ok(val) = std::env::var("CARDIMA_REGISTRATION_SUCCESS_DWELL_MS") {
        if let Ok(ms) = val.parse() {
            config.registration.success_dwell_ms = ms;
        }
    }

    if let Ok(val) = std::env::var("CARDIMA_ALERTS_CRITICAL_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.alerts.critical_threshold = threshold;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CARDIMA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CARDIMA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CARDIMA_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${CARDIMA_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("CARDIMA_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CARDIMA_LOADER_MISSING_A");
        std::env::remove_var("CARDIMA_LOADER_MISSING_B");
        let input = "a = \"${CARDIMA_LOADER_MISSING_A}\"\nb = \"${CARDIMA_LOADER_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("CARDIMA_LOADER_MISSING_A"));
        assert!(msg.contains("CARDIMA_LOADER_MISSING_B"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("CARDIMA_LOADER_COMMENTED");
        let input = "# password = \"${CARDIMA_LOADER_COMMENTED}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${CARDIMA_LOADER_COMMENTED}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(CardimaError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[api]
base_url = "https://cardima.example.org/api"
email = "demo@cardima.ai"
password = "password123"

[simulation]
debounce_ms = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://cardima.example.org/api");
        assert_eq!(config.api.email.as_deref(), Some("demo@cardima.ai"));
        assert_eq!(
            config.api.password.as_ref().unwrap().expose_secret(),
            "password123"
        );
        assert_eq!(config.simulation.debounce_ms, 250);
        assert_eq!(config.registration.success_dwell_ms, 1200);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let toml_content = r#"
[api]
base_url = "cardima.example.org"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
