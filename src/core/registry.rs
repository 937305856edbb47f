//! Patient registry
//!
//! Fetching the registry into the store, opening a patient on the dashboard,
//! and the search/filter/sort rules of the patient list.

use crate::adapters::api::ClinicalApi;
use crate::core::store::{AppStore, NoticeLevel};
use crate::domain::{ApiError, EcgSignal, Patient, PatientId, Result, RiskLevel};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const REGISTRY_FAILED: &str = "Failed to load the patient registry";
const SIGNAL_FAILED: &str = "Failed to load waveform data";

/// Risk filter of the patient list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RiskFilter {
    #[default]
    All,
    /// Predicted risk High
    HighRisk,
    /// Low, Medium or unknown risk
    Stable,
}

impl RiskFilter {
    pub fn matches(self, patient: &Patient) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::HighRisk => patient.effective_risk() == RiskLevel::High,
            RiskFilter::Stable => patient.effective_risk() != RiskLevel::High,
        }
    }
}

impl FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "all" => Ok(RiskFilter::All),
            "high-risk" | "high" => Ok(RiskFilter::HighRisk),
            "stable" => Ok(RiskFilter::Stable),
            other => Err(format!(
                "Unknown filter '{other}'. Must be one of: all, high-risk, stable"
            )),
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskFilter::All => "all",
            RiskFilter::HighRisk => "high-risk",
            RiskFilter::Stable => "stable",
        })
    }
}

/// Search text plus risk filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryQuery {
    pub search: String,
    pub filter: RiskFilter,
}

impl RegistryQuery {
    /// Matching patients, most urgent first
    ///
    /// Search is a case-insensitive substring match on name or id. Patients
    /// of equal risk keep their registry order.
    pub fn apply<'a>(&self, patients: &'a [Patient]) -> Vec<&'a Patient> {
        let needle = self.search.trim().to_lowercase();
        let mut matches: Vec<&Patient> = patients
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.id.as_str().to_lowercase().contains(&needle)
            })
            .filter(|p| self.filter.matches(p))
            .collect();

        // sort_by_key is stable
        matches.sort_by_key(|p| std::cmp::Reverse(p.effective_risk().priority()));
        matches
    }
}

/// Number of patients with High predicted risk
pub fn high_risk_count(patients: &[Patient]) -> usize {
    patients
        .iter()
        .filter(|p| p.predicted_risk_level == Some(RiskLevel::High))
        .count()
}

/// Registry operations backed by the API
pub struct RegistryService {
    store: AppStore,
    api: Arc<dyn ClinicalApi>,
}

impl RegistryService {
    pub fn new(store: AppStore, api: Arc<dyn ClinicalApi>) -> Self {
        Self { store, api }
    }

    /// Replace the stored registry with the API's
    ///
    /// # Errors
    ///
    /// Fails when signed out or when the request fails; the stored registry is
    /// left as it was and a notice is raised.
    pub async fn refresh_registry(&self) -> Result<usize> {
        let token = self.store.require_token()?;
        match self.api.list_patients(&token).await {
            Ok(patients) => {
                let count = patients.len();
                tracing::info!(count, "Registry refreshed");
                self.store.set_patients(patients);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch patients");
                self.store
                    .raise_notice(NoticeLevel::Error, e.notice_message(REGISTRY_FAILED));
                Err(e)
            }
        }
    }

    /// Show a patient on the dashboard
    ///
    /// Refreshes the registry once when the patient is not in the store yet.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PatientNotFound`] when the id is unknown after the
    /// refresh.
    pub async fn open_patient(&self, id: &PatientId) -> Result<Patient> {
        let cached = self.store.read(|s| s.find_patient(id).cloned());
        let patient = match cached {
            Some(patient) => patient,
            None => {
                tracing::debug!(patient_id = %id, "Patient not cached, refreshing registry");
                self.refresh_registry().await?;
                self.store
                    .read(|s| s.find_patient(id).cloned())
                    .ok_or_else(|| ApiError::PatientNotFound(id.to_string()))?
            }
        };

        self.store.load_patient(&patient);
        Ok(patient)
    }

    /// Waveform samples of a patient's ECG
    pub async fn fetch_signal(&self, id: &PatientId) -> Result<EcgSignal> {
        let token = self.store.require_token()?;
        self.api.fetch_signal(&token, id).await.map_err(|e| {
            tracing::warn!(patient_id = %id, error = %e, "Failed to fetch signal");
            self.store
                .raise_notice(NoticeLevel::Error, e.notice_message(SIGNAL_FAILED));
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::{ApiCall, ScriptedApi};
    use crate::adapters::token_storage::MemoryTokenStorage;
    use crate::domain::CardimaError;
    use test_case::test_case;

    fn patient(id: &str, name: &str, risk: Option<&str>) -> Patient {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": name,
            "predicted_risk_level": risk,
            "demographics": {"age": 50, "sex": "M", "height": 180, "weight": 80},
            "diagnostic_probabilities": {"MI": 0.4}
        }))
        .unwrap()
    }

    fn registry() -> Vec<Patient> {
        vec![
            patient("a1", "Alice Stone", Some("Low")),
            patient("b2", "Bob Marsh", Some("HIGH")),
            patient("c3", "Carla Diaz", None),
            patient("d4", "Dan Brooks", Some("Medium")),
            patient("e5", "Eve Stone", Some("high")),
        ]
    }

    fn ids(patients: &[&Patient]) -> Vec<String> {
        patients.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_query_sorts_by_risk_stably() {
        let patients = registry();
        let result = RegistryQuery::default().apply(&patients);
        assert_eq!(ids(&result), vec!["b2", "e5", "d4", "a1", "c3"]);
    }

    #[test_case("stone", &["e5", "a1"]; "name match")]
    #[test_case("B2", &["b2"]; "id match is case insensitive")]
    #[test_case("zzz", &[]; "no match")]
    #[test_case("  ", &["b2", "e5", "d4", "a1", "c3"]; "blank search")]
    fn test_query_search(search: &str, expected: &[&str]) {
        let patients = registry();
        let query = RegistryQuery {
            search: search.to_string(),
            filter: RiskFilter::All,
        };
        assert_eq!(ids(&query.apply(&patients)), expected);
    }

    #[test_case(RiskFilter::HighRisk, &["b2", "e5"])]
    #[test_case(RiskFilter::Stable, &["d4", "a1", "c3"])]
    fn test_query_filter(filter: RiskFilter, expected: &[&str]) {
        let patients = registry();
        let query = RegistryQuery {
            search: String::new(),
            filter,
        };
        assert_eq!(ids(&query.apply(&patients)), expected);
    }

    #[test_case("all", RiskFilter::All)]
    #[test_case("High-Risk", RiskFilter::HighRisk)]
    #[test_case("high_risk", RiskFilter::HighRisk)]
    #[test_case("stable", RiskFilter::Stable)]
    fn test_filter_parse(input: &str, expected: RiskFilter) {
        assert_eq!(input.parse::<RiskFilter>().unwrap(), expected);
    }

    #[test]
    fn test_filter_parse_invalid() {
        assert!("critical".parse::<RiskFilter>().is_err());
    }

    #[test]
    fn test_high_risk_count() {
        assert_eq!(high_risk_count(&registry()), 2);
        assert_eq!(high_risk_count(&[]), 0);
    }

    fn setup() -> (RegistryService, AppStore, Arc<ScriptedApi>) {
        let store = AppStore::new(Arc::new(MemoryTokenStorage::with_token("tok1")));
        let api = Arc::new(ScriptedApi::new());
        (RegistryService::new(store.clone(), api.clone()), store, api)
    }

    #[tokio::test]
    async fn test_refresh_replaces_registry() {
        let (service, store, api) = setup();
        store.set_patients(vec![patient("old", "Old", None)]);
        api.push_patients(Ok(registry()));

        assert_eq!(service.refresh_registry().await.unwrap(), 5);
        assert_eq!(store.snapshot().patients.len(), 5);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_registry() {
        let (service, store, api) = setup();
        store.set_patients(vec![patient("old", "Old", None)]);
        api.push_patients(Err(ApiError::Timeout("slow".to_string()).into()));

        assert!(service.refresh_registry().await.is_err());
        let state = store.snapshot();
        assert_eq!(state.patients.len(), 1);
        assert_eq!(state.notice.unwrap().message, REGISTRY_FAILED);
    }

    #[tokio::test]
    async fn test_refresh_requires_session() {
        let store = AppStore::new(Arc::new(MemoryTokenStorage::new()));
        let api = Arc::new(ScriptedApi::new());
        let service = RegistryService::new(store, api.clone());

        let err = service.refresh_registry().await.unwrap_err();
        assert!(matches!(err, CardimaError::Authentication(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_cached_patient() {
        let (service, store, api) = setup();
        store.set_patients(registry());

        let opened = service
            .open_patient(&PatientId::new("d4").unwrap())
            .await
            .unwrap();

        assert_eq!(opened.name, "Dan Brooks");
        assert!(api.calls().is_empty());
        let state = store.snapshot();
        assert_eq!(state.active_patient.unwrap().as_str(), "d4");
        assert!((state.predictions.mi - 40.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_open_refreshes_once_when_missing() {
        let (service, store, api) = setup();
        api.push_patients(Ok(registry()));

        service
            .open_patient(&PatientId::new("e5").unwrap())
            .await
            .unwrap();
        assert_eq!(api.calls(), vec![ApiCall::ListPatients]);
        assert_eq!(store.snapshot().active_patient.unwrap().as_str(), "e5");
    }

    #[tokio::test]
    async fn test_open_unknown_patient() {
        let (service, store, api) = setup();
        api.push_patients(Ok(registry()));

        let err = service
            .open_patient(&PatientId::new("zz").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CardimaError::Api(ApiError::PatientNotFound(ref id)) if id == "zz"
        ));
        assert!(store.snapshot().active_patient.is_none());
    }
}
