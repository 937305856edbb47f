//! Clinician sign-in and sign-out

use crate::adapters::api::{ClinicalApi, LoginRequest};
use crate::config::SecretString;
use crate::core::store::{AppStore, NoticeLevel};
use crate::domain::{CardimaError, Doctor, Result};
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::Arc;

const LOGIN_FAILED: &str = "Authentication failed. Please check your credentials.";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Login and logout against the API, recorded in the store
pub struct SessionService {
    store: AppStore,
    api: Arc<dyn ClinicalApi>,
}

impl SessionService {
    pub fn new(store: AppStore, api: Arc<dyn ClinicalApi>) -> Self {
        Self { store, api }
    }

    /// Sign in and persist the access token
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty password
    /// without contacting the API. Rejected credentials raise a notice and are
    /// returned as an API error.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<Doctor> {
        let email = email.trim();
        validate_credentials(email, &password)?;

        let request = LoginRequest {
            email: email.to_string(),
            password,
        };

        match self.api.login(&request).await {
            Ok(response) => {
                let doctor = response.doctor.clone();
                self.store.set_auth(response.doctor, response.access_token);
                self.store.raise_notice(
                    NoticeLevel::Info,
                    format!("Welcome back, Dr. {}", doctor.name),
                );
                Ok(doctor)
            }
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "Login failed");
                self.store
                    .raise_notice(NoticeLevel::Error, e.notice_message(LOGIN_FAILED));
                Err(e)
            }
        }
    }

    /// Clear the session and the persisted token
    pub fn logout(&self) {
        self.store.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.read(|s| s.session.is_authenticated())
    }

    pub fn current_doctor(&self) -> Option<Doctor> {
        self.store.read(|s| s.session.doctor.clone())
    }
}

fn validate_credentials(email: &str, password: &SecretString) -> Result<()> {
    let pattern = Regex::new(EMAIL_PATTERN)
        .map_err(|e| CardimaError::Other(format!("Invalid email pattern: {e}")))?;
    if !pattern.is_match(email) {
        return Err(CardimaError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }

    let password: &str = password.expose_secret().as_ref();
    if password.is_empty() {
        return Err(CardimaError::Validation("Password is required".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::{ApiCall, LoginResponse, ScriptedApi};
    use crate::adapters::token_storage::MemoryTokenStorage;
    use crate::config::secret_string;
    use crate::domain::{ApiError, DoctorId};

    fn setup() -> (SessionService, AppStore, Arc<ScriptedApi>, Arc<MemoryTokenStorage>) {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = AppStore::new(storage.clone());
        let api = Arc::new(ScriptedApi::new());
        (
            SessionService::new(store.clone(), api.clone()),
            store,
            api,
            storage,
        )
    }

    fn login_response() -> LoginResponse {
        LoginResponse {
            access_token: secret_string("tok1".to_string()),
            doctor: Doctor {
                id: DoctorId::new("d1").unwrap(),
                name: "Meredith Grey".to_string(),
                email: "grey@cardima.ai".to_string(),
                hospital_id: "h1".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let (session, store, api, storage) = setup();
        api.push_login(Ok(login_response()));

        let doctor = session
            .login(" grey@cardima.ai ", secret_string("password123".to_string()))
            .await
            .unwrap();

        assert_eq!(doctor.name, "Meredith Grey");
        assert!(session.is_authenticated());
        assert_eq!(storage.stored().as_deref(), Some("tok1"));
        assert_eq!(
            api.calls(),
            vec![ApiCall::Login {
                email: "grey@cardima.ai".to_string()
            }]
        );
        assert_eq!(
            store.snapshot().notice.unwrap().message,
            "Welcome back, Dr. Meredith Grey"
        );
    }

    #[tokio::test]
    async fn test_invalid_email_is_not_sent() {
        let (session, _, api, _) = setup();
        let err = session
            .login("not-an-email", secret_string("pw".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CardimaError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_password_is_not_sent() {
        let (session, _, api, _) = setup();
        let err = session
            .login("grey@cardima.ai", secret_string(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CardimaError::Validation(ref m) if m == "Password is required"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_credentials_raise_notice() {
        let (session, store, api, storage) = setup();
        api.push_login(Err(ApiError::AuthenticationFailed(String::new()).into()));

        assert!(session
            .login("grey@cardima.ai", secret_string("wrong".to_string()))
            .await
            .is_err());

        assert!(!session.is_authenticated());
        assert!(storage.stored().is_none());
        let notice = store.snapshot().notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(
            notice.message,
            "Authentication failed. Please check your credentials."
        );
    }

    #[tokio::test]
    async fn test_server_message_wins() {
        let (session, store, api, _) = setup();
        api.push_login(Err(ApiError::AuthenticationFailed(
            "Account locked".to_string(),
        )
        .into()));

        let _ = session
            .login("grey@cardima.ai", secret_string("pw".to_string()))
            .await;
        assert_eq!(store.snapshot().notice.unwrap().message, "Account locked");
    }

    #[tokio::test]
    async fn test_logout() {
        let (session, _, api, storage) = setup();
        api.push_login(Ok(login_response()));
        session
            .login("grey@cardima.ai", secret_string("pw".to_string()))
            .await
            .unwrap();

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.current_doctor().is_none());
        assert!(storage.stored().is_none());
    }
}
