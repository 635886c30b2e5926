//! Save and update flows behind the patient forms.
//!
//! Each form owns a [`PredictionSession`]. A flow checks the completion gate,
//! runs the remote prediction when every lab is present, and writes the
//! result through the store. The store lock is never held across the
//! prediction await.
//!
//! Late writes: when a session is cancelled (the form went away) while a
//! prediction is outstanding, the flow stops and writes nothing.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use dialyze_predict::{
    missing_lab_fields, FeatureVector, LabField, PredictError, Predictor,
};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{
    ClinicalPatch, LabValues, NewPatient, Patient, PatientPatch, RiskAssessment,
};
use crate::store::{PatientStore, StoreError};

/// Flow errors.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Prediction(#[from] PredictError),

    #[error("Missing lab values: {}", join_fields(.0))]
    IncompleteLabs(Vec<LabField>),

    #[error("A prediction is already running for this form")]
    AlreadyPredicting,

    #[error("Prediction cancelled")]
    Cancelled,

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<PoisonError<T>> for FlowError {
    fn from(e: PoisonError<T>) -> Self {
        FlowError::LockPoisoned(e.to_string())
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

fn join_fields(fields: &[LabField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-form prediction state: reentrancy guard plus cancellation.
#[derive(Debug)]
pub struct PredictionSession {
    cancelled: watch::Sender<bool>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the flow finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PredictionSession {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Cancel outstanding and future work for this form.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Whether a submission is running; the form disables its button meanwhile.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn begin(&self) -> FlowResult<InFlight<'_>> {
        if self.is_cancelled() {
            return Err(FlowError::Cancelled);
        }
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| FlowError::AlreadyPredicting)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Run `fut` unless the session is cancelled first.
    async fn run<F: Future>(&self, fut: F) -> FlowResult<F::Output> {
        let mut cancelled = self.cancelled.subscribe();
        tokio::select! {
            biased;
            _ = cancelled.wait_for(|c| *c) => Err(FlowError::Cancelled),
            out = fut => Ok(out),
        }
    }

    fn ensure_live(&self) -> FlowResult<()> {
        if self.is_cancelled() {
            Err(FlowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for PredictionSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-progress contents of the add-patient form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
    pub name: String,
    pub photo_uri: Option<String>,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
    pub notes: String,
    pub lab_values: LabValues,
}

impl PatientDraft {
    fn into_new_patient(self, assessment: Option<RiskAssessment>) -> NewPatient {
        NewPatient {
            id: None,
            name: Some(self.name),
            avatar: self.photo_uri.clone(),
            clinical: Some(ClinicalPatch {
                age: Some(self.age),
                gender: Some(self.gender),
                height: Some(self.height),
                weight: Some(self.weight),
                notes: Some(self.notes),
                photo_uri: Some(self.photo_uri),
            }),
            lab_values: Some(self.lab_values),
            assessment,
        }
    }
}

/// What happened to the prediction step of a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionStatus {
    /// Completion gate missed; these labs were blank
    Skipped { missing: Vec<LabField> },
    /// Prediction ran and its result was stored
    Applied(RiskAssessment),
    /// Prediction failed; the record was saved without it
    Failed { message: String },
}

/// Outcome of a save or update flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub patient: Patient,
    pub prediction: PredictionStatus,
}

impl FlowReport {
    /// Text for the dismissible error notice, if one should be shown.
    pub fn notice(&self) -> Option<String> {
        match &self.prediction {
            PredictionStatus::Failed { message } => {
                Some(format!("Could not get model prediction:\n{}", message))
            }
            _ => None,
        }
    }
}

enum Step {
    Skipped(Vec<LabField>),
    Predicted(RiskAssessment),
    Failed(String),
}

/// Gate, then predict under the session. `Err` only for cancellation.
async fn predict_step<P: Predictor>(
    predictor: &P,
    session: &PredictionSession,
    lab_values: &LabValues,
) -> FlowResult<Step> {
    let missing = missing_lab_fields(lab_values);
    if !missing.is_empty() {
        tracing::debug!(missing = missing.len(), "labs incomplete, skipping prediction");
        return Ok(Step::Skipped(missing));
    }

    let features = FeatureVector::from_lab_values(lab_values);
    let result = match session.run(predictor.predict(&features)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("prediction cancelled, discarding result");
            return Err(e);
        }
    };
    session.ensure_live()?;

    match result {
        Ok(prediction) => {
            let assessment = RiskAssessment::from_prediction(&prediction);
            tracing::info!(risk = %assessment.label, pct = %assessment.pct, "prediction complete");
            Ok(Step::Predicted(assessment))
        }
        Err(e) => {
            tracing::warn!(error = %e, "prediction failed, saving without it");
            Ok(Step::Failed(e.to_string()))
        }
    }
}

/// Save a new patient from the add form.
pub async fn submit_new_patient<P: Predictor>(
    store: &Mutex<PatientStore>,
    predictor: &P,
    session: &PredictionSession,
    draft: PatientDraft,
) -> FlowResult<FlowReport> {
    let _in_flight = session.begin()?;

    let step = predict_step(predictor, session, &draft.lab_values).await?;
    let (assessment, prediction) = match step {
        Step::Skipped(missing) => (None, PredictionStatus::Skipped { missing }),
        Step::Predicted(a) => (Some(a.clone()), PredictionStatus::Applied(a)),
        Step::Failed(message) => (None, PredictionStatus::Failed { message }),
    };

    let patient = {
        let mut store = store.lock()?;
        store.add(draft.into_new_patient(assessment))?.clone()
    };
    tracing::info!(patient_id = %patient.id, "saved new patient");

    Ok(FlowReport {
        patient,
        prediction,
    })
}

/// Replace lab values on an existing patient, re-running the prediction when complete.
///
/// The labs are merged into the stored ones, and the completion gate looks at
/// the merged set. Risk fields change only when a prediction succeeds.
pub async fn update_lab_values<P: Predictor>(
    store: &Mutex<PatientStore>,
    predictor: &P,
    session: &PredictionSession,
    patient_id: &str,
    lab_values: LabValues,
) -> FlowResult<FlowReport> {
    let _in_flight = session.begin()?;

    // Stored labs with the form's edits laid over them.
    let edited = {
        let store = store.lock()?;
        let mut edited = store.require(patient_id)?.lab_values.clone();
        edited.extend(lab_values.iter().map(|(k, v)| (k.clone(), v.clone())));
        edited
    };

    let step = predict_step(predictor, session, &edited).await?;
    let (patch, prediction) = match step {
        Step::Skipped(missing) => (
            PatientPatch::labs_only(lab_values),
            PredictionStatus::Skipped { missing },
        ),
        Step::Predicted(a) => (
            PatientPatch::from_assessment(a.clone()).with_lab_values(lab_values),
            PredictionStatus::Applied(a),
        ),
        Step::Failed(message) => (
            PatientPatch::labs_only(lab_values),
            PredictionStatus::Failed { message },
        ),
    };

    let patient = {
        let mut store = store.lock()?;
        match store.update(patient_id, &patch) {
            Some(p) => p.clone(),
            None => {
                tracing::warn!(patient_id = %patient_id, "patient removed while predicting");
                return Err(StoreError::NotFound(patient_id.to_string()).into());
            }
        }
    };

    Ok(FlowReport {
        patient,
        prediction,
    })
}

/// Fields edited on the clinical-info form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub clinical: ClinicalPatch,
}

/// Apply the clinical-info form. Never touches risk fields.
pub fn update_clinical_info(
    store: &Mutex<PatientStore>,
    patient_id: &str,
    update: ClinicalUpdate,
) -> FlowResult<Patient> {
    let patch = PatientPatch {
        name: update.name,
        avatar: update.avatar,
        clinical: Some(update.clinical),
        ..Default::default()
    };

    let mut store = store.lock()?;
    let patient = store
        .update(patient_id, &patch)
        .ok_or_else(|| StoreError::NotFound(patient_id.to_string()))?;
    Ok(patient.clone())
}

/// One-off prediction that is not stored anywhere.
pub async fn quick_predict<P: Predictor>(
    predictor: &P,
    lab_values: &LabValues,
) -> FlowResult<RiskAssessment> {
    let missing = missing_lab_fields(lab_values);
    if !missing.is_empty() {
        return Err(FlowError::IncompleteLabs(missing));
    }

    let features = FeatureVector::from_lab_values(lab_values);
    let prediction = predictor.predict(&features).await?;
    Ok(RiskAssessment::from_prediction(&prediction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_guard_blocks_reentry() {
        let session = PredictionSession::new();
        let guard = session.begin().unwrap();
        assert!(session.is_in_flight());
        assert!(matches!(session.begin(), Err(FlowError::AlreadyPredicting)));
        drop(guard);
        assert!(!session.is_in_flight());
        assert!(session.begin().is_ok());
    }

    #[test]
    fn test_cancelled_session_refuses_work() {
        let session = PredictionSession::new();
        session.cancel();
        assert!(session.is_cancelled());
        assert!(matches!(session.begin(), Err(FlowError::Cancelled)));
    }

    #[test]
    fn test_draft_conversion() {
        let draft = PatientDraft {
            name: "Ada".into(),
            photo_uri: Some("file:///ada.jpg".into()),
            age: "40".into(),
            ..Default::default()
        };
        let new = draft.into_new_patient(None);
        let clinical = new.clinical.unwrap();
        assert_eq!(clinical.age.as_deref(), Some("40"));
        assert_eq!(clinical.weight.as_deref(), Some(""));
        assert_eq!(clinical.photo_uri, Some(Some("file:///ada.jpg".into())));
        assert_eq!(new.avatar.as_deref(), Some("file:///ada.jpg"));
        assert!(new.assessment.is_none());
    }

    #[test]
    fn test_incomplete_labs_message() {
        let err = FlowError::IncompleteLabs(vec![LabField::Hco3, LabField::Ph]);
        assert_eq!(err.to_string(), "Missing lab values: HCO3, pH");
    }

    #[test]
    fn test_notice_only_on_failure() {
        let patient = {
            let mut store = PatientStore::default();
            store.add(NewPatient::named("Ada")).unwrap().clone()
        };
        let report = FlowReport {
            patient: patient.clone(),
            prediction: PredictionStatus::Failed {
                message: "timeout".into(),
            },
        };
        assert_eq!(
            report.notice().as_deref(),
            Some("Could not get model prediction:\ntimeout")
        );

        let report = FlowReport {
            patient,
            prediction: PredictionStatus::Skipped { missing: vec![] },
        };
        assert_eq!(report.notice(), None);
    }
}
