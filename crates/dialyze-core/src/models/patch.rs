//! Partial updates.
//!
//! A patch carries only the fields the caller wants to change. `None` means
//! "leave as is"; `Some("")` overwrites with an empty string. Fields that are
//! themselves nullable use `Option<Option<_>>` so that "set to null" is
//! distinct from "not mentioned".

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::patient::{ClinicalInfo, LabValues, Patient};
use super::risk::{RiskAssessment, RiskLabel};

/// Deserialize a present field (including an explicit `null`) as `Some(_)`.
/// Combined with `#[serde(default)]`, an absent field stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial update of [`ClinicalInfo`], merged key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<Option<String>>,
}

impl ClinicalPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying this patch can change the derived details line.
    pub fn touches_details(&self) -> bool {
        self.age.is_some() || self.gender.is_some()
    }

    /// Merge into existing clinical info.
    pub fn apply_to(&self, clinical: &mut ClinicalInfo) {
        if let Some(age) = &self.age {
            clinical.age = age.clone();
        }
        if let Some(gender) = &self.gender {
            clinical.gender = gender.clone();
        }
        if let Some(height) = &self.height {
            clinical.height = height.clone();
        }
        if let Some(weight) = &self.weight {
            clinical.weight = weight.clone();
        }
        if let Some(notes) = &self.notes {
            clinical.notes = notes.clone();
        }
        if let Some(photo_uri) = &self.photo_uri {
            clinical.photo_uri = photo_uri.clone();
        }
    }

    /// Fill a fresh record, defaulting missing fields to empty.
    pub fn to_clinical(&self) -> ClinicalInfo {
        let mut clinical = ClinicalInfo::default();
        self.apply_to(&mut clinical);
        clinical
    }
}

/// Partial update of a [`Patient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical: Option<ClinicalPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_values: Option<LabValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_label: Option<RiskLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_pct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_color: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<Option<Value>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub predicted_proba: Option<Option<f64>>,
}

impl PatientPatch {
    /// Lab edits without a prediction run; risk fields stay as they are.
    pub fn labs_only(lab_values: LabValues) -> Self {
        Self {
            lab_values: Some(lab_values),
            ..Default::default()
        }
    }

    /// Every risk field from one prediction run.
    pub fn from_assessment(assessment: RiskAssessment) -> Self {
        Self {
            risk_label: Some(assessment.label),
            risk_pct: Some(assessment.pct),
            risk_color: Some(assessment.color),
            predicted_class: Some(assessment.predicted_class),
            predicted_proba: Some(assessment.predicted_proba),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_clinical(mut self, clinical: ClinicalPatch) -> Self {
        self.clinical = Some(clinical);
        self
    }

    pub fn with_lab_values(mut self, lab_values: LabValues) -> Self {
        self.lab_values = Some(lab_values);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the patch writes any risk field.
    pub fn touches_risk(&self) -> bool {
        self.risk_label.is_some()
            || self.risk_pct.is_some()
            || self.risk_color.is_some()
            || self.predicted_class.is_some()
            || self.predicted_proba.is_some()
    }

    /// Produce the merged record. The input is not modified.
    pub fn apply(&self, patient: &Patient) -> Patient {
        let mut merged = patient.clone();

        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(avatar) = &self.avatar {
            merged.avatar = avatar.clone();
        }
        if let Some(clinical) = &self.clinical {
            clinical.apply_to(&mut merged.clinical);
            if clinical.touches_details() {
                merged.details = merged.clinical.details();
            }
        }
        if let Some(lab_values) = &self.lab_values {
            merged
                .lab_values
                .extend(lab_values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        if let Some(label) = self.risk_label {
            merged.risk_label = label;
        }
        if let Some(pct) = &self.risk_pct {
            merged.risk_pct = pct.clone();
        }
        if let Some(color) = &self.risk_color {
            merged.risk_color = color.clone();
        }
        if let Some(class) = &self.predicted_class {
            merged.predicted_class = class.clone();
        }
        if let Some(proba) = self.predicted_proba {
            merged.predicted_proba = proba;
        }

        merged
    }
}
