//! Logout command implementation

use super::load_context;
use crate::core::session::SessionService;
use clap::Args;

/// Arguments for the logout command
#[derive(Args, Debug)]
pub struct LogoutArgs {}

impl LogoutArgs {
    /// Execute the logout command
    ///
    /// Local only; the API is not contacted.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match load_context(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let session = SessionService::new(ctx.store.clone(), ctx.api.clone());
        if !session.is_authenticated() {
            println!("Not signed in.");
            return Ok(0);
        }

        session.logout();
        tracing::info!("Session cleared");
        println!("✅ Signed out");
        Ok(0)
    }
}
