//! External system integrations for Cardima.
//!
//! This module provides adapters for the systems the client talks to:
//!
//! - [`api`] - The clinical REST API (login, registry, registration,
//!   checklist, simulation, waveforms)
//! - [`token_storage`] - Durable storage for the session access token
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-process implementations. Both adapters sit behind a
//! trait ([`api::ClinicalApi`], [`token_storage::TokenStorage`]) so the store
//! and workflows never see reqwest or the filesystem.
//!
//! ```rust,no_run
//! use cardima::adapters::api::{ClinicalApi, HttpApiClient};
//! use cardima::adapters::token_storage::{FileTokenStorage, TokenStorage};
//! use cardima::config::ApiConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpApiClient::new(&ApiConfig::default())?;
//! let storage = FileTokenStorage::new(".cardima/session_token");
//!
//! if let Some(token) = storage.load()? {
//!     let patients = client.list_patients(&token).await?;
//!     println!("{} patients", patients.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod token_storage;
