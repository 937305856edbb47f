//! reqwest implementation of the clinical API
//!
//! Every request carries a fresh `X-Request-Id` and, except login, the
//! session's bearer token. Non-success statuses are mapped onto [`ApiError`]
//! with the server's JSON `message` preserved for the notice banner.
//! Requests are never retried.

use super::models::{
    ChecklistOutcome, ChecklistSubmission, LoginRequest, LoginResponse, PatientRegistration,
    RegisterResponse, SimulationRequest, SimulationResponse,
};
use super::traits::ClinicalApi;
use crate::config::{ApiConfig, SecretString};
use crate::domain::{
    ApiError, CardimaError, DiagnosticProbabilities, EcgSignal, Patient, PatientId, Result,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest raw body echoed into an error when the server sent no JSON message
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the clinical API
///
/// # Example
///
/// ```no_run
/// use cardima::adapters::api::HttpApiClient;
/// use cardima::config::ApiConfig;
///
/// let config = ApiConfig {
///     base_url: "https://cardima.example.org/api".to_string(),
///     ..Default::default()
/// };
/// let client = HttpApiClient::new(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: Client,
}

impl HttpApiClient {
    /// Build a client from the `[api]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification is disabled"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            CardimaError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, builder: RequestBuilder, token: Option<&SecretString>) -> RequestBuilder {
        let builder = builder.header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        match token {
            Some(token) => {
                let value: &str = token.expose_secret().as_ref();
                builder.bearer_auth(value)
            }
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<Response> {
        let start = std::time::Instant::now();
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        crate::log_api_call!(operation, status.as_u16(), start.elapsed().as_millis());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body).into())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        let response = self.send(builder, operation).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CardimaError::from(ApiError::InvalidResponse(format!("{operation}: {e}"))))
    }
}

#[async_trait]
impl ClinicalApi for HttpApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        tracing::debug!(email = %request.email, "Logging in");
        let builder = self.request(self.client.post(self.url("auth/login")), None);
        self.send_json(builder.json(request), "login").await
    }

    async fn list_patients(&self, token: &SecretString) -> Result<Vec<Patient>> {
        let builder = self.request(self.client.get(self.url("patients")), Some(token));
        self.send_json(builder, "list_patients").await
    }

    async fn register_patient(
        &self,
        token: &SecretString,
        registration: &PatientRegistration,
    ) -> Result<Patient> {
        tracing::info!(
            mrn = %registration.mrn,
            file = %registration.ecg.file_name,
            bytes = registration.ecg.bytes.len(),
            "Uploading patient registration"
        );

        let file = Part::bytes(registration.ecg.bytes.clone())
            .file_name(registration.ecg.file_name.clone());
        let form = Form::new()
            .text("mrn", registration.mrn.to_string())
            .text("name", registration.name.clone())
            .text("age", registration.age.to_string())
            .text("sex", registration.sex.to_string())
            .text("height", registration.height.to_string())
            .text("weight", registration.weight.to_string())
            .part("file", file);

        let builder = self.request(self.client.post(self.url("patients")), Some(token));
        let response: RegisterResponse = self
            .send_json(builder.multipart(form), "register_patient")
            .await?;
        Ok(response.patient)
    }

    async fn submit_checklist(
        &self,
        token: &SecretString,
        submission: &ChecklistSubmission,
    ) -> Result<ChecklistOutcome> {
        let builder = self.request(
            self.client.post(self.url("ai/submit-checklist")),
            Some(token),
        );
        let response = self
            .send(builder.json(submission), "submit_checklist")
            .await?;

        // The body shape is not guaranteed; an empty or non-JSON body is still a success.
        let text = response.text().await.unwrap_or_default();
        let raw = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Ok(ChecklistOutcome::from_value(raw))
    }

    async fn simulate(
        &self,
        token: &SecretString,
        request: &SimulationRequest,
    ) -> Result<DiagnosticProbabilities> {
        let builder = self.request(
            self.client.post(self.url("inference/simulate")),
            Some(token),
        );
        let response: SimulationResponse = self.send_json(builder.json(request), "simulate").await?;
        Ok(response.probabilities)
    }

    async fn fetch_signal(
        &self,
        token: &SecretString,
        patient_id: &PatientId,
    ) -> Result<EcgSignal> {
        let path = format!("patients/{}/signal", patient_id.as_str());
        let builder = self.request(self.client.get(self.url(&path)), Some(token));
        match self.send_json(builder, "fetch_signal").await {
            Err(CardimaError::Api(ApiError::ClientError { status: 404, .. })) => {
                Err(ApiError::PatientNotFound(patient_id.to_string()).into())
            }
            other => other,
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(err: reqwest::Error) -> CardimaError {
    if err.is_timeout() {
        ApiError::Timeout(err.to_string()).into()
    } else {
        ApiError::ConnectionFailed(err.to_string()).into()
    }
}

/// Maps a non-success status and its body onto an [`ApiError`]
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = server_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthenticationFailed(message),
        s if s.is_client_error() => ApiError::ClientError {
            status: s.as_u16(),
            message,
        },
        s => ApiError::ServerError {
            status: s.as_u16(),
            message,
        },
    }
}

/// The explanation the server gave, or an empty string
///
/// Prefers the JSON `message` field; a short plain-text body is used as is.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return value
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.trim().to_string())
            .unwrap_or_default();
    }

    let body = body.trim();
    if body.starts_with('<') {
        return String::new();
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}
