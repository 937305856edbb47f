//! Show command implementation
//!
//! Renders a patient's dashboard: status, diagnostic profile, critical alert
//! and the AI narrative.

use super::{load_context, report_failure};
use crate::core::alert::CriticalAlert;
use crate::core::registry::RegistryService;
use crate::domain::{Pathology, Patient, PatientId, Predictions};
use clap::Args;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Patient ID
    pub patient_id: PatientId,
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let registry = RegistryService::new(ctx.store.clone(), ctx.api.clone());
        let patient = match registry.open_patient(&self.patient_id).await {
            Ok(patient) => patient,
            Err(e) => return Ok(report_failure(&ctx.store, &e)),
        };

        let predictions = ctx.store.read(|s| s.predictions);
        print_header(&patient);
        print_alert(&predictions, ctx.config.alerts.critical_threshold);
        print_profile(&predictions);
        print_analysis(&patient);
        Ok(0)
    }
}

fn print_header(patient: &Patient) {
    println!("🫀 {} [{}]", patient.name, patient.status_label());
    println!("   Patient ID: {}", patient.id.display_code());
    if !patient.mrn.is_empty() {
        println!("   MRN: {}", patient.mrn);
    }
    if let Some(d) = &patient.demographics {
        println!(
            "   Age {} | Sex {} | Height {} cm | Weight {} kg",
            d.age, d.sex, d.height, d.weight
        );
    }
    if let Some(date) = patient.last_ecg_date {
        println!("   Last ECG: {}", date.format("%Y-%m-%d %H:%M"));
    }
    println!();
}

pub(crate) fn print_alert(predictions: &Predictions, threshold: f64) {
    if let Some(alert) = CriticalAlert::evaluate(predictions, threshold) {
        println!("🚨 {alert}");
        println!("   Immediate clinical review recommended.");
        println!();
    }
}

pub(crate) fn print_profile(predictions: &Predictions) {
    println!("Diagnostic Profile:");
    for line in profile_lines(predictions) {
        println!("  {line}");
    }
    println!();
}

fn profile_lines(predictions: &Predictions) -> Vec<String> {
    Pathology::DISPLAY_ORDER
        .iter()
        .map(|&pathology| {
            let value = predictions.get(pathology);
            let filled = (value.clamp(0.0, 100.0) / 5.0).round() as usize;
            format!(
                "{:<24} {:>5.1}% {}{}",
                pathology.label(),
                value,
                "█".repeat(filled),
                "░".repeat(20 - filled)
            )
        })
        .collect()
}

fn print_analysis(patient: &Patient) {
    let Some(analysis) = &patient.ai_analysis else {
        return;
    };

    if !analysis.narrative_report.is_empty() {
        println!("AI Analysis:");
        println!("  {}", analysis.narrative_report);
        println!();
    }

    if !analysis.recommended_tests.is_empty() {
        println!("Recommended Tests:");
        for test in &analysis.recommended_tests {
            println!("  - {test}");
        }
        println!();
    }

    let relevant: Vec<_> = analysis
        .validation_checklist
        .iter()
        .filter(|item| item.is_relevant)
        .collect();
    if !relevant.is_empty() {
        println!("Validation Checklist:");
        for item in relevant {
            println!("  ? {}", item.question);
        }
        println!();
    }
}
