//! In-memory patient store.
//!
//! The single source of truth for every screen. State lives for the life of
//! the process only; nothing is written to disk.

mod demo;
mod ids;

use thiserror::Error;

use crate::models::{NewPatient, Patient, PatientPatch, RiskAssessment, UNNAMED_PATIENT};
use ids::IdGenerator;

/// Avatar used when neither an avatar nor a photo was supplied.
pub const DEFAULT_AVATAR: &str = "asset://placeholder.png";

/// Store errors.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Duplicate patient id: {0}")]
    DuplicateId(String),

    #[error("Invalid patient record: {0}")]
    InvalidRecord(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store configuration resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub default_avatar: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_avatar: DEFAULT_AVATAR.to_string(),
        }
    }
}

/// Ordered patient list, most recently added first.
#[derive(Debug)]
pub struct PatientStore {
    patients: Vec<Patient>,
    ids: IdGenerator,
    config: StoreConfig,
}

impl PatientStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            patients: Vec::new(),
            ids: IdGenerator::default(),
            config,
        }
    }

    /// Create a store seeded with the demo patients.
    pub fn with_demo_patients(config: StoreConfig) -> Self {
        let mut store = Self::new(config);
        store.patients = demo::demo_patients(&store.config.default_avatar);
        for patient in &store.patients {
            store.ids.observe(&patient.id);
        }
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// All patients in display order.
    pub fn list(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Look up a patient by id.
    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Look up a patient that a screen expects to exist.
    pub fn require(&self, id: &str) -> StoreResult<&Patient> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Case-insensitive name search, keeping list order. An empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&Patient> {
        let needle = query.to_lowercase();
        self.patients
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Normalize and insert a new patient at the head of the list.
    pub fn add(&mut self, new: NewPatient) -> StoreResult<&Patient> {
        let id = match new.id {
            Some(id) => {
                if id.trim().is_empty() {
                    return Err(StoreError::InvalidRecord("id cannot be empty".into()));
                }
                if self.get(&id).is_some() {
                    return Err(StoreError::DuplicateId(id));
                }
                self.ids.observe(&id);
                id
            }
            None => self.fresh_id(),
        };

        let clinical = new.clinical.map(|c| c.to_clinical()).unwrap_or_default();

        let name = new
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_PATIENT.to_string());

        let avatar = new
            .avatar
            .filter(|a| !a.is_empty())
            .or_else(|| clinical.photo_uri.clone())
            .unwrap_or_else(|| self.config.default_avatar.clone());

        let mut patient = Patient {
            id,
            name,
            avatar,
            details: clinical.details(),
            clinical,
            lab_values: new.lab_values.unwrap_or_default(),
            risk_label: Default::default(),
            risk_pct: String::new(),
            risk_color: String::new(),
            predicted_class: None,
            predicted_proba: None,
        };
        patient.set_assessment(new.assessment.unwrap_or_else(RiskAssessment::not_available));

        tracing::debug!(patient_id = %patient.id, risk = %patient.risk_label, "added patient");
        self.patients.insert(0, patient);
        Ok(&self.patients[0])
    }

    /// Delete a patient. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.patients.len();
        self.patients.retain(|p| p.id != id);
        let removed = self.patients.len() != before;
        if removed {
            tracing::debug!(patient_id = %id, "removed patient");
        }
        removed
    }

    /// Merge a patch into a patient.
    ///
    /// The merged record replaces the old one in a single step. Returns `None`
    /// and leaves the store untouched when no patient has this id.
    pub fn update(&mut self, id: &str, patch: &PatientPatch) -> Option<&Patient> {
        let Some(index) = self.patients.iter().position(|p| p.id == id) else {
            tracing::debug!(patient_id = %id, "update ignored, no such patient");
            return None;
        };

        let merged = patch.apply(&self.patients[index]);
        self.patients[index] = merged;

        tracing::debug!(
            patient_id = %id,
            touches_risk = patch.touches_risk(),
            "updated patient"
        );
        Some(&self.patients[index])
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for PatientStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
