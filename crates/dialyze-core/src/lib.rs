//! Dialyze Core Library
//!
//! Patient store and AKI risk prediction flows behind the Dialyze mobile app.
//!
//! # Architecture
//!
//! ```text
//!   Add / Update form ──► PatientDraft / LabValues
//!                                 │
//!                         Completion gate (12 labs)
//!                          │                   │
//!                     all present           missing
//!                          │                   │
//!              Inference endpoint (HTTPS)      │
//!                 │               │            │
//!              success         failure         │
//!                 │               └──────┬─────┘
//!        labs + risk patch        labs-only patch
//!                 └──────────┬───────────┘
//!                            ▼
//!                 PatientStore (in memory)
//! ```
//!
//! # Core Principle
//!
//! **Updates merge, never replace.** A patch only writes the fields it
//! carries; risk fields are written together by a prediction run or not at all.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, PatientPatch, RiskAssessment, etc.)
//! - [`store`]: In-memory patient store with merge semantics
//! - [`flows`]: Save/update flows with the completion gate and cancellable predictions

pub mod flows;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use dialyze_predict::{LabField, Prediction, Predictor};
pub use flows::{
    FlowError, FlowReport, FlowResult, PatientDraft, PredictionSession, PredictionStatus,
};
pub use models::{
    ClinicalInfo, ClinicalPatch, LabValues, NewPatient, Patient, PatientPatch, RiskAssessment,
    RiskLabel,
};
pub use store::{PatientStore, StoreConfig, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dialyze_predict::{ConfigError, HttpPredictor, PredictError, PredictorConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DialyzeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Busy: {0}")]
    AlreadyPredicting(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for DialyzeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => DialyzeError::NotFound(id),
            other => DialyzeError::InvalidInput(other.to_string()),
        }
    }
}

impl From<FlowError> for DialyzeError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Store(e) => e.into(),
            FlowError::Prediction(e) => e.into(),
            FlowError::IncompleteLabs(_) => DialyzeError::InvalidInput(e.to_string()),
            FlowError::AlreadyPredicting => DialyzeError::AlreadyPredicting(e.to_string()),
            FlowError::Cancelled => DialyzeError::Cancelled(e.to_string()),
            FlowError::LockPoisoned(_) => DialyzeError::Internal(e.to_string()),
        }
    }
}

impl From<PredictError> for DialyzeError {
    fn from(e: PredictError) -> Self {
        DialyzeError::PredictionError(e.to_string())
    }
}

impl From<ConfigError> for DialyzeError {
    fn from(e: ConfigError) -> Self {
        DialyzeError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for DialyzeError {
    fn from(e: serde_json::Error) -> Self {
        DialyzeError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DialyzeError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DialyzeError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

const DEFAULT_LOG_FILTER: &str = "dialyze_core=info,dialyze_predict=info";

/// Install the log subscriber. Later calls are no-ops.
///
/// `filter` uses `RUST_LOG` syntax; defaults to info for the Dialyze crates.
/// A filter that does not parse is rejected and nothing is installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> Result<(), DialyzeError> {
    let filter = match filter {
        Some(f) => tracing_subscriber::EnvFilter::try_new(&f)
            .map_err(|e| DialyzeError::InvalidInput(format!("log filter {:?}: {}", f, e)))?,
        None => tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    Ok(())
}

/// Open an empty store.
#[uniffi::export]
pub fn open_store(config: FfiCoreConfig) -> Result<Arc<DialyzeCore>, DialyzeError> {
    let (store_config, predictor_config) = config.resolve()?;
    DialyzeCore::build(PatientStore::new(store_config), &predictor_config)
}

/// Open a store seeded with the demo patients.
#[uniffi::export]
pub fn open_store_with_demo_patients(
    config: FfiCoreConfig,
) -> Result<Arc<DialyzeCore>, DialyzeError> {
    let (store_config, predictor_config) = config.resolve()?;
    DialyzeCore::build(
        PatientStore::with_demo_patients(store_config),
        &predictor_config,
    )
}

/// Open an empty store, reading the endpoint from the environment (`.env` honoured).
#[uniffi::export]
pub fn open_store_from_env(
    default_avatar: Option<String>,
) -> Result<Arc<DialyzeCore>, DialyzeError> {
    let predictor_config = PredictorConfig::from_env()?;
    let mut store_config = StoreConfig::default();
    if let Some(avatar) = default_avatar {
        store_config.default_avatar = avatar;
    }
    DialyzeCore::build(PatientStore::new(store_config), &predictor_config)
}

// =========================================================================
// Pure helpers (exported to FFI)
// =========================================================================

/// Risk label for a probability ("Low", "Medium", "High" or "N/A").
#[uniffi::export]
pub fn classify_probability(proba: Option<f64>) -> String {
    models::classify_risk(proba).to_string()
}

/// Probability as a one-decimal percentage, or "N/A".
#[uniffi::export]
pub fn format_probability(proba: Option<f64>) -> String {
    models::format_pct(proba)
}

/// Badge color for a risk label; unknown labels get the N/A color.
#[uniffi::export]
pub fn risk_color(label: String) -> String {
    RiskLabel::from_label(&label)
        .unwrap_or_default()
        .color()
        .to_string()
}

/// The lab vocabulary in form order.
#[uniffi::export]
pub fn lab_fields() -> Vec<FfiLabField> {
    LabField::ALL
        .into_iter()
        .map(|f| FfiLabField {
            key: f.key().to_string(),
            unit: f.unit().to_string(),
        })
        .collect()
}

/// Labs still blank, in form order. Empty means prediction will run.
#[uniffi::export]
pub fn missing_labs(lab_values: HashMap<String, String>) -> Vec<String> {
    let lab_values: LabValues = lab_values.into_iter().collect();
    dialyze_predict::missing_lab_fields(&lab_values)
        .into_iter()
        .map(|f| f.key().to_string())
        .collect()
}

/// Numeric-entry filter for lab text fields.
#[uniffi::export]
pub fn sanitize_lab_value(text: String) -> String {
    dialyze_predict::sanitize_lab_input(&text)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store handle for FFI.
#[derive(uniffi::Object)]
pub struct DialyzeCore {
    store: Arc<Mutex<PatientStore>>,
    predictor: HttpPredictor,
}

impl DialyzeCore {
    fn build(
        store: PatientStore,
        predictor_config: &PredictorConfig,
    ) -> Result<Arc<Self>, DialyzeError> {
        let predictor = HttpPredictor::new(predictor_config)?;
        tracing::info!(endpoint = %predictor.endpoint_url(), patients = store.len(), "opened patient store");
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
            predictor,
        }))
    }
}

#[uniffi::export]
impl DialyzeCore {
    // =========================================================================
    // Store Operations
    // =========================================================================

    /// All patients, most recently added first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, DialyzeError> {
        let store = self.store.lock()?;
        Ok(store.list().iter().cloned().map(Into::into).collect())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, DialyzeError> {
        let store = self.store.lock()?;
        Ok(store.get(&id).cloned().map(Into::into))
    }

    /// Search patients by name.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, DialyzeError> {
        let store = self.store.lock()?;
        Ok(store.search(&query).into_iter().cloned().map(Into::into).collect())
    }

    /// Add a patient.
    pub fn add_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, DialyzeError> {
        let new: NewPatient = patient.into();
        let mut store = self.store.lock()?;
        let added = store.add(new)?;
        Ok(added.clone().into())
    }

    /// Remove a patient. Returns false if there was none.
    pub fn remove_patient(&self, id: String) -> Result<bool, DialyzeError> {
        let mut store = self.store.lock()?;
        Ok(store.remove(&id))
    }

    /// Merge a patch into a patient. Returns `None` if there is no such patient.
    pub fn update_patient(
        &self,
        id: String,
        patch: FfiPatientPatch,
    ) -> Result<Option<FfiPatient>, DialyzeError> {
        let patch = PatientPatch::try_from(patch)?;
        let mut store = self.store.lock()?;
        Ok(store.update(&id, &patch).cloned().map(Into::into))
    }

    // =========================================================================
    // Form Flows
    // =========================================================================

    /// Apply the clinical-info form.
    pub fn update_clinical_info(
        &self,
        id: String,
        update: FfiClinicalUpdate,
    ) -> Result<FfiPatient, DialyzeError> {
        let patient = flows::update_clinical_info(&self.store, &id, update.into())?;
        Ok(patient.into())
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl DialyzeCore {
    /// Save the add-patient form, predicting first when every lab is filled.
    pub async fn submit_new_patient(
        &self,
        session: Arc<FfiPredictionSession>,
        draft: FfiPatientDraft,
    ) -> Result<FfiFlowReport, DialyzeError> {
        let report =
            flows::submit_new_patient(&self.store, &self.predictor, &session.inner, draft.into())
                .await?;
        Ok(report.into())
    }

    /// Save the lab-values form for an existing patient.
    pub async fn update_lab_values(
        &self,
        session: Arc<FfiPredictionSession>,
        patient_id: String,
        lab_values: HashMap<String, String>,
    ) -> Result<FfiFlowReport, DialyzeError> {
        let lab_values: LabValues = lab_values.into_iter().collect();
        let report = flows::update_lab_values(
            &self.store,
            &self.predictor,
            &session.inner,
            &patient_id,
            lab_values,
        )
        .await?;
        Ok(report.into())
    }

    /// Predict from labs alone without saving anything.
    pub async fn quick_predict(
        &self,
        lab_values: HashMap<String, String>,
    ) -> Result<FfiRiskAssessment, DialyzeError> {
        let lab_values: LabValues = lab_values.into_iter().collect();
        let assessment = flows::quick_predict(&self.predictor, &lab_values).await?;
        Ok(assessment.into())
    }
}

/// One per open form. Cancel it when the form is dismissed.
#[derive(uniffi::Object, Default)]
pub struct FfiPredictionSession {
    inner: PredictionSession,
}

#[uniffi::export]
impl FfiPredictionSession {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.is_in_flight()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// Startup configuration supplied by the host app.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCoreConfig {
    pub endpoint_url: String,
    pub timeout_secs: Option<u64>,
    pub default_avatar: Option<String>,
}

impl FfiCoreConfig {
    fn resolve(self) -> Result<(StoreConfig, PredictorConfig), DialyzeError> {
        let mut predictor = PredictorConfig::new(self.endpoint_url)?;
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            predictor = predictor.with_timeout(std::time::Duration::from_secs(secs));
        }
        let mut store = StoreConfig::default();
        if let Some(avatar) = self.default_avatar {
            store.default_avatar = avatar;
        }
        Ok((store, predictor))
    }
}

/// FFI-safe lab field description.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabField {
    pub key: String,
    pub unit: String,
}

/// FFI-safe clinical info.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicalInfo {
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
    pub notes: String,
    pub photo_uri: Option<String>,
}

impl From<ClinicalInfo> for FfiClinicalInfo {
    fn from(c: ClinicalInfo) -> Self {
        Self {
            age: c.age,
            gender: c.gender,
            height: c.height,
            weight: c.weight,
            notes: c.notes,
            photo_uri: c.photo_uri,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub details: String,
    pub clinical: FfiClinicalInfo,
    pub lab_values: HashMap<String, String>,
    pub risk_label: String,
    pub risk_pct: String,
    pub risk_color: String,
    /// JSON text of the model's class output
    pub predicted_class: Option<String>,
    pub predicted_proba: Option<f64>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            avatar: patient.avatar,
            details: patient.details,
            clinical: patient.clinical.into(),
            lab_values: patient.lab_values.into_iter().collect(),
            risk_label: patient.risk_label.to_string(),
            risk_pct: patient.risk_pct,
            risk_color: patient.risk_color,
            predicted_class: patient.predicted_class.map(|v| v.to_string()),
            predicted_proba: patient.predicted_proba,
        }
    }
}

/// FFI-safe clinical patch. `None` leaves a field unchanged.
///
/// `photo_uri` can only be set; `clear_photo_uri` removes it and wins over
/// a value in the same patch.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiClinicalPatch {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
    pub photo_uri: Option<String>,
    #[uniffi(default = false)]
    pub clear_photo_uri: bool,
}

impl From<FfiClinicalPatch> for ClinicalPatch {
    fn from(p: FfiClinicalPatch) -> Self {
        ClinicalPatch {
            age: p.age,
            gender: p.gender,
            height: p.height,
            weight: p.weight,
            notes: p.notes,
            photo_uri: if p.clear_photo_uri {
                Some(None)
            } else {
                p.photo_uri.map(Some)
            },
        }
    }
}

/// FFI-safe new patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub clinical: Option<FfiClinicalPatch>,
    pub lab_values: Option<HashMap<String, String>>,
}

impl From<FfiNewPatient> for NewPatient {
    fn from(p: FfiNewPatient) -> Self {
        NewPatient {
            id: None,
            name: p.name,
            avatar: p.avatar,
            clinical: p.clinical.map(Into::into),
            lab_values: p.lab_values.map(|l| l.into_iter().collect()),
            assessment: None,
        }
    }
}

/// FFI-safe patient patch. `None` leaves a field unchanged.
///
/// `predicted_class` is JSON text; the text `null` clears it.
/// `predicted_proba` can only be set; `clear_predicted_proba` removes it and
/// wins over a value in the same patch.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientPatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub clinical: Option<FfiClinicalPatch>,
    pub lab_values: Option<HashMap<String, String>>,
    pub risk_label: Option<String>,
    pub risk_pct: Option<String>,
    pub risk_color: Option<String>,
    pub predicted_class: Option<String>,
    pub predicted_proba: Option<f64>,
    #[uniffi(default = false)]
    pub clear_predicted_proba: bool,
}

impl TryFrom<FfiPatientPatch> for PatientPatch {
    type Error = DialyzeError;

    fn try_from(p: FfiPatientPatch) -> Result<Self, Self::Error> {
        let risk_label = p
            .risk_label
            .map(|label| {
                RiskLabel::from_label(&label)
                    .ok_or_else(|| DialyzeError::InvalidInput(format!("unknown risk label: {}", label)))
            })
            .transpose()?;
        let predicted_class = p
            .predicted_class
            .map(|text| serde_json::from_str::<serde_json::Value>(&text))
            .transpose()?
            .map(|v| if v.is_null() { None } else { Some(v) });

        Ok(PatientPatch {
            name: p.name,
            avatar: p.avatar,
            clinical: p.clinical.map(Into::into),
            lab_values: p.lab_values.map(|l| l.into_iter().collect()),
            risk_label,
            risk_pct: p.risk_pct,
            risk_color: p.risk_color,
            predicted_class,
            predicted_proba: if p.clear_predicted_proba {
                Some(None)
            } else {
                p.predicted_proba.map(Some)
            },
        })
    }
}

/// FFI-safe clinical-info form contents.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicalUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub clinical: FfiClinicalPatch,
}

impl From<FfiClinicalUpdate> for flows::ClinicalUpdate {
    fn from(u: FfiClinicalUpdate) -> Self {
        flows::ClinicalUpdate {
            name: u.name,
            avatar: u.avatar,
            clinical: u.clinical.into(),
        }
    }
}

/// FFI-safe add-patient form contents.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDraft {
    pub name: String,
    pub photo_uri: Option<String>,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
    pub notes: String,
    pub lab_values: HashMap<String, String>,
}

impl From<FfiPatientDraft> for PatientDraft {
    fn from(d: FfiPatientDraft) -> Self {
        PatientDraft {
            name: d.name,
            photo_uri: d.photo_uri,
            age: d.age,
            gender: d.gender,
            height: d.height,
            weight: d.weight,
            notes: d.notes,
            lab_values: d.lab_values.into_iter().collect(),
        }
    }
}

/// FFI-safe risk assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRiskAssessment {
    pub risk_label: String,
    pub risk_pct: String,
    pub risk_color: String,
    pub predicted_class: Option<String>,
    pub predicted_proba: Option<f64>,
}

impl From<RiskAssessment> for FfiRiskAssessment {
    fn from(a: RiskAssessment) -> Self {
        Self {
            risk_label: a.label.to_string(),
            risk_pct: a.pct,
            risk_color: a.color,
            predicted_class: a.predicted_class.map(|v| v.to_string()),
            predicted_proba: a.predicted_proba,
        }
    }
}

/// FFI-safe prediction status.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiPredictionStatus {
    Skipped { missing: Vec<String> },
    Applied { assessment: FfiRiskAssessment },
    Failed { message: String },
}

impl From<PredictionStatus> for FfiPredictionStatus {
    fn from(status: PredictionStatus) -> Self {
        match status {
            PredictionStatus::Skipped { missing } => FfiPredictionStatus::Skipped {
                missing: missing.into_iter().map(|f| f.key().to_string()).collect(),
            },
            PredictionStatus::Applied(assessment) => FfiPredictionStatus::Applied {
                assessment: assessment.into(),
            },
            PredictionStatus::Failed { message } => FfiPredictionStatus::Failed { message },
        }
    }
}

/// FFI-safe flow result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFlowReport {
    pub patient: FfiPatient,
    pub status: FfiPredictionStatus,
    /// Error notice to show the user, if any
    pub notice: Option<String>,
}

impl From<FlowReport> for FfiFlowReport {
    fn from(report: FlowReport) -> Self {
        let notice = report.notice();
        Self {
            patient: report.patient.into(),
            status: report.prediction.into(),
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_core() -> Arc<DialyzeCore> {
        open_store_with_demo_patients(FfiCoreConfig {
            endpoint_url: "http://127.0.0.1:9/invocations".into(),
            timeout_secs: Some(1),
            default_avatar: None,
        })
        .unwrap()
    }

    #[test]
    fn test_open_store_rejects_bad_url() {
        let result = open_store(FfiCoreConfig {
            endpoint_url: "not a url".into(),
            timeout_secs: None,
            default_avatar: None,
        });
        assert!(matches!(result, Err(DialyzeError::ConfigError(_))));
    }

    #[test]
    fn test_ffi_store_roundtrip() {
        let core = demo_core();
        assert_eq!(core.list_patients().unwrap().len(), 4);

        let added = core
            .add_patient(FfiNewPatient {
                name: Some("Ada".into()),
                avatar: None,
                clinical: Some(FfiClinicalPatch {
                    age: Some("40".into()),
                    ..Default::default()
                }),
                lab_values: None,
            })
            .unwrap();
        assert_eq!(added.risk_label, "N/A");
        assert_eq!(core.list_patients().unwrap()[0].id, added.id);

        let updated = core
            .update_patient(
                added.id.clone(),
                FfiPatientPatch {
                    risk_label: Some("High".into()),
                    risk_pct: Some("85.0%".into()),
                    risk_color: Some("#e53935".into()),
                    predicted_class: Some("1".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.risk_label, "High");
        assert_eq!(updated.predicted_class.as_deref(), Some("1"));
        assert_eq!(updated.clinical.age, "40");

        assert!(core.remove_patient(added.id.clone()).unwrap());
        assert!(core.get_patient(added.id).unwrap().is_none());
    }

    #[test]
    fn test_ffi_patch_rejects_unknown_label() {
        let core = demo_core();
        let result = core.update_patient(
            "1".into(),
            FfiPatientPatch {
                risk_label: Some("Severe".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(DialyzeError::InvalidInput(_))));
    }

    #[test]
    fn test_ffi_update_clinical_info_missing_patient() {
        let core = demo_core();
        let result = core.update_clinical_info(
            "missing".into(),
            FfiClinicalUpdate {
                name: None,
                avatar: None,
                clinical: FfiClinicalPatch::default(),
            },
        );
        assert!(matches!(result, Err(DialyzeError::NotFound(_))));
    }

    #[test]
    fn test_pure_helpers() {
        assert_eq!(classify_probability(Some(0.05)), "Low");
        assert_eq!(classify_probability(None), "N/A");
        assert_eq!(format_probability(Some(0.153)), "15.3%");
        assert_eq!(risk_color("High".into()), "#e53935");
        assert_eq!(risk_color("bogus".into()), "#cccccc");
        assert_eq!(lab_fields().len(), 12);
        assert_eq!(lab_fields()[2].key, "Mean Arterial Pressure");
        assert_eq!(missing_labs(HashMap::new()).len(), 12);
        assert_eq!(sanitize_lab_value("1,2a.5".into()), "12.5");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Some("dialyze_core=debug".into())).unwrap();
        init_logging(None).unwrap();
    }

    #[test]
    fn test_init_logging_rejects_bad_filter() {
        let result = init_logging(Some("dialyze_core=loudest".into()));
        assert!(matches!(result, Err(DialyzeError::InvalidInput(_))));
    }

    #[test]
    fn test_ffi_patch_clears_nullable_fields() {
        let core = demo_core();
        let before = core.get_patient("2".into()).unwrap().unwrap();

        let updated = core
            .update_patient(
                "2".into(),
                FfiPatientPatch {
                    clinical: Some(FfiClinicalPatch {
                        photo_uri: Some("file:///sophia.jpg".into()),
                        ..Default::default()
                    }),
                    predicted_proba: Some(0.3),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.clinical.photo_uri.as_deref(), Some("file:///sophia.jpg"));
        assert_eq!(updated.predicted_proba, Some(0.3));

        let cleared = core
            .update_patient(
                "2".into(),
                FfiPatientPatch {
                    clinical: Some(FfiClinicalPatch {
                        clear_photo_uri: true,
                        ..Default::default()
                    }),
                    predicted_class: Some("null".into()),
                    clear_predicted_proba: true,
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(cleared.clinical.photo_uri, None);
        assert_eq!(cleared.predicted_class, None);
        assert_eq!(cleared.predicted_proba, None);
        assert_eq!(cleared.risk_label, before.risk_label);
    }
}
