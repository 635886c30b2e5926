//! Patient models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::patch::ClinicalPatch;
use super::risk::{RiskAssessment, RiskLabel};

/// Lab entries keyed by lab name. Values are raw strings as typed; an empty
/// string or a missing key means "not entered".
pub type LabValues = BTreeMap<String, String>;

/// Name shown when the user leaves the name blank.
pub const UNNAMED_PATIENT: &str = "Unnamed Patient";

/// Clinical details, kept as raw strings until a consumer parses them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicalInfo {
    pub age: String,
    pub gender: String,
    /// Height in cm
    pub height: String,
    /// Weight in kg
    pub weight: String,
    pub notes: String,
    pub photo_uri: Option<String>,
}

impl ClinicalInfo {
    /// Summary line shown under the patient's name, e.g. `"Age: 65, Male"`.
    pub fn details(&self) -> String {
        fn or_na(s: &str) -> &str {
            let s = s.trim();
            if s.is_empty() {
                "N/A"
            } else {
                s
            }
        }
        format!("Age: {}, {}", or_na(&self.age), or_na(&self.gender))
    }
}

/// A tracked patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned, unique and immutable
    pub id: String,
    pub name: String,
    /// Image reference (URI or bundled placeholder)
    pub avatar: String,
    /// Derived from `clinical`, not authoritative
    pub details: String,
    pub clinical: ClinicalInfo,
    pub lab_values: LabValues,
    pub risk_label: RiskLabel,
    pub risk_pct: String,
    pub risk_color: String,
    pub predicted_class: Option<Value>,
    pub predicted_proba: Option<f64>,
}

impl Patient {
    /// Current risk fields as one bundle.
    pub fn assessment(&self) -> RiskAssessment {
        RiskAssessment {
            label: self.risk_label,
            pct: self.risk_pct.clone(),
            color: self.risk_color.clone(),
            predicted_class: self.predicted_class.clone(),
            predicted_proba: self.predicted_proba,
        }
    }

    /// Overwrite every risk field at once.
    pub fn set_assessment(&mut self, assessment: RiskAssessment) {
        self.risk_label = assessment.label;
        self.risk_pct = assessment.pct;
        self.risk_color = assessment.color;
        self.predicted_class = assessment.predicted_class;
        self.predicted_proba = assessment.predicted_proba;
    }

    /// Whether the record holds every lab the model needs.
    pub fn has_complete_labs(&self) -> bool {
        dialyze_predict::all_labs_filled(&self.lab_values)
    }
}

/// Input to [`PatientStore::add`](crate::store::PatientStore::add).
///
/// Everything is optional; the store fills in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    /// Normally left empty so the store assigns one
    pub id: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub clinical: Option<ClinicalPatch>,
    pub lab_values: Option<LabValues>,
    pub assessment: Option<RiskAssessment>,
}

impl NewPatient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_clinical(mut self, clinical: ClinicalPatch) -> Self {
        self.clinical = Some(clinical);
        self
    }

    pub fn with_lab_values(mut self, lab_values: LabValues) -> Self {
        self.lab_values = Some(lab_values);
        self
    }

    pub fn with_assessment(mut self, assessment: RiskAssessment) -> Self {
        self.assessment = Some(assessment);
        self
    }
}
