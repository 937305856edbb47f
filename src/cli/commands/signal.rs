//! Signal command implementation

use super::{load_context, report_failure};
use crate::core::registry::RegistryService;
use crate::domain::PatientId;
use clap::Args;

/// Arguments for the signal command
#[derive(Args, Debug)]
pub struct SignalArgs {
    /// Patient ID
    pub patient_id: PatientId,
}

impl SignalArgs {
    /// Execute the signal command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let registry = RegistryService::new(ctx.store.clone(), ctx.api.clone());
        let signal = match registry.fetch_signal(&self.patient_id).await {
            Ok(signal) => signal,
            Err(e) => return Ok(report_failure(&ctx.store, &e)),
        };

        println!("📈 ECG Signal: {}", signal.patient_id.display_code());
        println!("   Sampling rate: {} Hz", signal.sampling_rate);
        println!();

        let summaries = signal.summaries();
        if summaries.is_empty() {
            println!("No leads recorded.");
            return Ok(0);
        }

        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>12}",
            "Lead", "Samples", "Min (mV)", "Max (mV)", "Duration (s)"
        );
        println!("{}", "-".repeat(54));
        for lead in summaries {
            println!(
                "{:<8} {:>10} {:>10.3} {:>10.3} {:>12.2}",
                lead.lead, lead.samples, lead.min, lead.max, lead.duration_seconds
            );
        }
        println!();
        Ok(0)
    }
}
