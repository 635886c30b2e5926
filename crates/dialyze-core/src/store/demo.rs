//! Demo records the app starts with.

use crate::models::{ClinicalInfo, LabValues, Patient, RiskLabel};

struct DemoPatient {
    id: &'static str,
    name: &'static str,
    risk_label: RiskLabel,
    risk_pct: &'static str,
    age: &'static str,
    gender: &'static str,
    height: &'static str,
    weight: &'static str,
    notes: &'static str,
    labs: [(&'static str, &'static str); 5],
}

const DEMO_PATIENTS: [DemoPatient; 4] = [
    DemoPatient {
        id: "1",
        name: "Ethan Carter",
        risk_label: RiskLabel::Medium,
        risk_pct: "50%",
        age: "65",
        gender: "Male",
        height: "175",
        weight: "75",
        notes: "",
        labs: [
            ("Creatinine", "2.5 mg/dL"),
            ("BUN", "40 mg/dL"),
            ("Potassium", "5.2 mEq/L"),
            ("Sodium", "138 mEq/L"),
            ("Bicarbonate", "22 mEq/L"),
        ],
    },
    DemoPatient {
        id: "2",
        name: "Sophia Clark",
        risk_label: RiskLabel::High,
        risk_pct: "90%",
        age: "72",
        gender: "Female",
        height: "160",
        weight: "68",
        notes: "Diabetic, HTN",
        labs: [
            ("Creatinine", "1.8 mg/dL"),
            ("BUN", "35 mg/dL"),
            ("Potassium", "4.8 mEq/L"),
            ("Sodium", "135 mEq/L"),
            ("Bicarbonate", "20 mEq/L"),
        ],
    },
    DemoPatient {
        id: "3",
        name: "John Smith",
        risk_label: RiskLabel::Low,
        risk_pct: "10%",
        age: "72",
        gender: "Male",
        height: "180",
        weight: "82",
        notes: "",
        labs: [
            ("Creatinine", "1.2 mg/dL"),
            ("BUN", "28 mg/dL"),
            ("Potassium", "4.5 mEq/L"),
            ("Sodium", "140 mEq/L"),
            ("Bicarbonate", "24 mEq/L"),
        ],
    },
    DemoPatient {
        id: "4",
        name: "Olivia Brown",
        risk_label: RiskLabel::Low,
        risk_pct: "25%",
        age: "20",
        gender: "Female",
        height: "",
        weight: "",
        notes: "",
        labs: [
            ("Creatinine", ""),
            ("BUN", ""),
            ("Potassium", ""),
            ("Sodium", ""),
            ("Bicarbonate", ""),
        ],
    },
];

pub(crate) fn demo_patients(avatar: &str) -> Vec<Patient> {
    DEMO_PATIENTS
        .iter()
        .map(|demo| {
            let clinical = ClinicalInfo {
                age: demo.age.into(),
                gender: demo.gender.into(),
                height: demo.height.into(),
                weight: demo.weight.into(),
                notes: demo.notes.into(),
                photo_uri: None,
            };
            let lab_values: LabValues = demo
                .labs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();

            Patient {
                id: demo.id.into(),
                name: demo.name.into(),
                avatar: avatar.into(),
                details: clinical.details(),
                clinical,
                lab_values,
                risk_label: demo.risk_label,
                risk_pct: demo.risk_pct.into(),
                risk_color: demo.risk_label.color().into(),
                predicted_class: None,
                predicted_proba: None,
            }
        })
        .collect()
}
