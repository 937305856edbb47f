//! Patients command implementation
//!
//! Prints the patient registry: searched, filtered by risk and sorted with
//! the most urgent patients first.

use super::{load_context, report_failure};
use crate::core::registry::{high_risk_count, RegistryQuery, RegistryService, RiskFilter};
use crate::domain::Patient;
use clap::Args;

/// Arguments for the patients command
#[derive(Args, Debug)]
pub struct PatientsArgs {
    /// Case-insensitive match on name or patient ID
    #[arg(short, long)]
    pub search: Option<String>,

    /// Risk filter (all, high-risk, stable)
    #[arg(short, long, default_value = "all")]
    pub filter: RiskFilter,
}

impl PatientsArgs {
    /// Execute the patients command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let registry = RegistryService::new(ctx.store.clone(), ctx.api.clone());
        if let Err(e) = registry.refresh_registry().await {
            return Ok(report_failure(&ctx.store, &e));
        }

        let query = RegistryQuery {
            search: self.search.clone().unwrap_or_default(),
            filter: self.filter,
        };

        let patients = ctx.store.read(|s| s.patients.clone());
        let matches = query.apply(&patients);

        println!("🩺 Patient Registry");
        println!(
            "   {} patient(s), {} high risk",
            patients.len(),
            high_risk_count(&patients)
        );
        println!();

        if matches.is_empty() {
            println!("No patients match the current search and filter.");
            return Ok(0);
        }

        println!(
            "{:<24} {:<16} {:<8} {:<24} {:<8} {:<12}",
            "Name", "Patient ID", "Age/Sex", "Diagnosis", "Risk", "Last ECG"
        );
        println!("{}", "-".repeat(96));
        for patient in &matches {
            println!("{}", registry_row(patient));
        }
        println!();
        Ok(0)
    }
}

fn registry_row(patient: &Patient) -> String {
    let age_sex = patient
        .demographics
        .map(|d| format!("{}/{}", d.age, d.sex))
        .unwrap_or_else(|| "-".to_string());
    let risk = patient
        .predicted_risk_level
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let last_ecg = patient
        .last_ecg_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<24} {:<16} {:<8} {:<24} {:<8} {:<12}",
        patient.name,
        patient.id.display_code(),
        age_sex,
        patient.primary_diagnosis(),
        risk,
        last_ecg
    )
}
