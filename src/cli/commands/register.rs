//! Register command implementation
//!
//! Uploads a new patient's demographics and ECG file, then answers the AI's
//! follow-up checklist from `--answer` flags when one comes back.

use super::{load_context, report_failure};
use crate::adapters::api::EcgAttachment;
use crate::core::registration::{RegistrationForm, RegistrationState, RegistrationWorkflow};
use crate::domain::{ChecklistItem, Sex};
use clap::Args;
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Arguments for the register command
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Sex (M or F)
    #[arg(long)]
    pub sex: Sex,

    /// Height in centimetres
    #[arg(long)]
    pub height: f64,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: f64,

    /// ECG recording to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Checklist answers in question order; unanswered questions are sent as "No"
    #[arg(long = "answer", value_name = "ANSWER")]
    pub answers: Vec<String>,
}

impl RegisterArgs {
    /// Execute the register command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let bytes = match std::fs::read(&self.file) {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("❌ Cannot read ECG file {}", self.file.display());
                println!("   Error: {e}");
                return Ok(1); // Validation error exit code
            }
        };
        let file_name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ecg".to_string());

        let workflow = RegistrationWorkflow::new(
            ctx.store.clone(),
            ctx.api.clone(),
            &ctx.config.registration,
        );
        let mut stages = workflow.transitions();

        println!("📋 Registering {}", self.name.trim());
        let form = RegistrationForm {
            name: self.name.clone(),
            age: self.age,
            sex: self.sex,
            height: self.height,
            weight: self.weight,
            ecg: Some(EcgAttachment::new(file_name, bytes)),
        };

        let mut state = match with_progress(&mut stages, workflow.submit(form)).await {
            Ok(state) => state,
            Err(e) => return Ok(report_failure(&ctx.store, &e)),
        };

        if let RegistrationState::Checklist { questions, .. } = &state {
            println!();
            println!("The analysis has follow-up questions:");
            for line in checklist_lines(questions, &self.answers) {
                println!("  {line}");
            }
            println!();

            state = match with_progress(&mut stages, workflow.submit_checklist(&self.answers)).await
            {
                Ok(state) => state,
                Err(e) => return Ok(report_failure(&ctx.store, &e)),
            };
        }

        match state {
            RegistrationState::Success { patient_id } => {
                println!();
                println!("✅ Patient registered: {}", patient_id.display_code());
                println!("   Run 'cardima show {patient_id}' to open the dashboard.");
                Ok(0)
            }
            other => {
                tracing::error!(state = other.name(), "Registration ended in unexpected state");
                println!("❌ Registration ended in state {}", other.name());
                Ok(5) // Fatal error exit code
            }
        }
    }
}

/// Drive `request` to completion, printing each processing stage as the
/// workflow enters it
async fn with_progress<F: Future>(
    stages: &mut broadcast::Receiver<RegistrationState>,
    request: F,
) -> F::Output {
    tokio::pin!(request);
    let output = loop {
        tokio::select! {
            biased;
            received = stages.recv() => match received {
                Ok(state) => print_stage(&state),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Progress printer fell behind");
                }
                Err(RecvError::Closed) => break (&mut request).await,
            },
            output = &mut request => break output,
        }
    };

    loop {
        match stages.try_recv() {
            Ok(state) => print_stage(&state),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    output
}

fn print_stage(state: &RegistrationState) {
    if let Some(line) = stage_line(state) {
        println!("{line}");
    }
}

fn stage_line(state: &RegistrationState) -> Option<String> {
    match state {
        RegistrationState::Processing(stage) => {
            Some(format!("   [{:>3}%] {}", stage.progress(), stage.label()))
        }
        _ => None,
    }
}

fn checklist_lines(questions: &[ChecklistItem], answers: &[String]) -> Vec<String> {
    questions
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let answer = answers
                .get(i)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .unwrap_or("No");
            format!("{}. {} -> {}", i + 1, item.question, answer)
        })
        .collect()
}
