//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Cardima using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cardima - ECG Diagnostics Client
#[derive(Parser, Debug)]
#[command(name = "cardima")]
#[command(version, about, long_about = None)]
#[command(author = "Cardima Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cardima.toml", env = "CARDIMA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CARDIMA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session token
    Login(commands::login::LoginArgs),

    /// Clear the stored session token
    Logout(commands::logout::LogoutArgs),

    /// List patients, most urgent first
    Patients(commands::patients::PatientsArgs),

    /// Show a patient's dashboard
    Show(commands::show::ShowArgs),

    /// Run a what-if simulation with a different age and weight
    Simulate(commands::simulate::SimulateArgs),

    /// Register a patient and upload their ECG
    Register(commands::register::RegisterArgs),

    /// Summarize a patient's ECG waveform
    Signal(commands::signal::SignalArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::RiskFilter;
    use crate::domain::Sex;

    #[test]
    fn test_cli_parse_patients() {
        let cli = Cli::parse_from(["cardima", "patients"]);
        assert_eq!(cli.config, "cardima.toml");
        match cli.command {
            Commands::Patients(args) => {
                assert_eq!(args.filter, RiskFilter::All);
                assert!(args.search.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cardima", "--config", "custom.toml", "logout"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Logout(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cardima", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_patients_filter() {
        let cli = Cli::parse_from([
            "cardima", "patients", "--search", "doe", "--filter", "high-risk",
        ]);
        match cli.command {
            Commands::Patients(args) => {
                assert_eq!(args.filter, RiskFilter::HighRisk);
                assert_eq!(args.search.as_deref(), Some("doe"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_filter() {
        let result = Cli::try_parse_from(["cardima", "patients", "--filter", "critical"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_simulate() {
        let cli = Cli::parse_from([
            "cardima", "simulate", "p1", "--age", "70", "--weight", "92.5",
        ]);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.patient_id.as_str(), "p1");
                assert_eq!(args.age, 70);
                assert_eq!(args.weight, 92.5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_register_with_answers() {
        let cli = Cli::parse_from([
            "cardima", "register", "--name", "Jane Doe", "--age", "61", "--sex", "female",
            "--height", "165", "--weight", "72.5", "--file", "ecg.csv", "--answer", "Yes",
            "--answer", "No",
        ]);
        match cli.command {
            Commands::Register(args) => {
                assert_eq!(args.sex, Sex::F);
                assert_eq!(args.answers, vec!["Yes", "No"]);
                assert_eq!(args.file.to_str(), Some("ecg.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cardima", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
