//! Login command implementation
//!
//! Signs in against the API and persists the access token for later
//! commands.

use super::{load_context, report_failure};
use crate::config::{secret_string, SecretString};
use crate::core::session::SessionService;
use clap::Args;
use std::io::{self, BufRead, Write};

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Login email (defaults to api.email)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password (defaults to api.password, then prompts)
    #[arg(short, long, env = "CARDIMA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    /// Execute the login command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let Some(email) = self.email.clone().or_else(|| ctx.config.api.email.clone()) else {
            println!("❌ No email given");
            println!("   Pass --email or set api.email in {config_path}");
            return Ok(1); // Validation error exit code
        };

        let password = match self.password_or_config(ctx.config.api.password.clone()) {
            Some(password) => password,
            None => prompt_password()?,
        };

        tracing::info!(email = %email, "Signing in");
        let session = SessionService::new(ctx.store.clone(), ctx.api.clone());
        match session.login(&email, password).await {
            Ok(doctor) => {
                println!("✅ Welcome back, Dr. {}", doctor.name);
                if !doctor.hospital_id.is_empty() {
                    println!("   Hospital: {}", doctor.hospital_id);
                }
                Ok(0)
            }
            Err(e) => Ok(report_failure(&ctx.store, &e)),
        }
    }

    fn password_or_config(&self, configured: Option<SecretString>) -> Option<SecretString> {
        self.password.clone().map(secret_string).or(configured)
    }
}

fn prompt_password() -> anyhow::Result<SecretString> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(secret_string(input.trim_end_matches(['\r', '\n']).to_string()))
}
