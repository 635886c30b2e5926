//! The fixed lab vocabulary the AKI model is trained on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the 12 lab inputs required by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabField {
    #[serde(rename = "HCO3")]
    Hco3,
    Creatinine,
    #[serde(rename = "Mean Arterial Pressure")]
    MeanArterialPressure,
    Procalcitonin,
    Bilirubin,
    #[serde(rename = "pH")]
    Ph,
    Albumin,
    Urea,
    #[serde(rename = "White Blood Cell Count")]
    WhiteBloodCellCount,
    #[serde(rename = "SOFA")]
    Sofa,
    #[serde(rename = "APACHEII")]
    ApacheII,
    Glasgow,
}

impl LabField {
    /// All fields, in the order the model and the entry form use.
    pub const ALL: [LabField; 12] = [
        LabField::Hco3,
        LabField::Creatinine,
        LabField::MeanArterialPressure,
        LabField::Procalcitonin,
        LabField::Bilirubin,
        LabField::Ph,
        LabField::Albumin,
        LabField::Urea,
        LabField::WhiteBloodCellCount,
        LabField::Sofa,
        LabField::ApacheII,
        LabField::Glasgow,
    ];

    /// Wire key, also used as the key in a patient's lab values.
    pub fn key(self) -> &'static str {
        match self {
            LabField::Hco3 => "HCO3",
            LabField::Creatinine => "Creatinine",
            LabField::MeanArterialPressure => "Mean Arterial Pressure",
            LabField::Procalcitonin => "Procalcitonin",
            LabField::Bilirubin => "Bilirubin",
            LabField::Ph => "pH",
            LabField::Albumin => "Albumin",
            LabField::Urea => "Urea",
            LabField::WhiteBloodCellCount => "White Blood Cell Count",
            LabField::Sofa => "SOFA",
            LabField::ApacheII => "APACHEII",
            LabField::Glasgow => "Glasgow",
        }
    }

    /// Look a field up by its exact wire key.
    pub fn from_key(key: &str) -> Option<LabField> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Display unit shown next to the entry field (empty for pH).
    pub fn unit(self) -> &'static str {
        match self {
            LabField::Hco3 => "mEq/L",
            LabField::Creatinine => "mg/dL",
            LabField::MeanArterialPressure => "mmHg",
            LabField::Procalcitonin => "ng/mL",
            LabField::Bilirubin => "mg/dL",
            LabField::Ph => "",
            LabField::Albumin => "g/dL",
            LabField::Urea => "mg/dL",
            LabField::WhiteBloodCellCount => "×10³/µL",
            LabField::Sofa | LabField::ApacheII | LabField::Glasgow => "points",
        }
    }
}

impl fmt::Display for LabField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn is_filled(values: &BTreeMap<String, String>, field: LabField) -> bool {
    values
        .get(field.key())
        .is_some_and(|v| !v.trim().is_empty())
}

/// Fields that are absent or blank, in vocabulary order.
pub fn missing_lab_fields(values: &BTreeMap<String, String>) -> Vec<LabField> {
    LabField::ALL
        .into_iter()
        .filter(|f| !is_filled(values, *f))
        .collect()
}

/// Completion gate: every vocabulary field holds a non-blank string.
pub fn all_labs_filled(values: &BTreeMap<String, String>) -> bool {
    LabField::ALL.into_iter().all(|f| is_filled(values, f))
}

/// Numeric-entry filter applied while the user types: digits and `.` only.
pub fn sanitize_lab_input(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}
