//! Risk bucketing for model probabilities.

use dialyze_predict::Prediction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Probabilities below this are low risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.10;
/// Probabilities at or above this are high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.20;

/// Discrete AKI risk bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    /// No prediction has been run, or it produced no probability
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl RiskLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
            RiskLabel::NotAvailable => "N/A",
        }
    }

    /// Parse the display string.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Low" => Some(RiskLabel::Low),
            "Medium" => Some(RiskLabel::Medium),
            "High" => Some(RiskLabel::High),
            "N/A" => Some(RiskLabel::NotAvailable),
            _ => None,
        }
    }

    /// Badge color. Presentation only.
    pub fn color(self) -> &'static str {
        match self {
            RiskLabel::Low => "#4caf50",
            RiskLabel::Medium => "#fbc02d",
            RiskLabel::High => "#e53935",
            RiskLabel::NotAvailable => "#cccccc",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a probability. Missing or non-finite input is `N/A`.
pub fn classify_risk(proba: Option<f64>) -> RiskLabel {
    match proba.filter(|p| p.is_finite()) {
        None => RiskLabel::NotAvailable,
        Some(p) if p < MEDIUM_RISK_THRESHOLD => RiskLabel::Low,
        Some(p) if p < HIGH_RISK_THRESHOLD => RiskLabel::Medium,
        Some(_) => RiskLabel::High,
    }
}

/// Format a probability as a percentage with one decimal, e.g. `"15.3%"`.
pub fn format_pct(proba: Option<f64>) -> String {
    match proba.filter(|p| p.is_finite()) {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => "N/A".to_string(),
    }
}

/// Everything a prediction run writes onto a patient, computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub pct: String,
    pub color: String,
    pub predicted_class: Option<Value>,
    pub predicted_proba: Option<f64>,
}

impl RiskAssessment {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        let label = classify_risk(prediction.predicted_proba);
        Self {
            label,
            pct: format_pct(prediction.predicted_proba),
            color: label.color().to_string(),
            predicted_class: prediction.predicted_class.clone(),
            predicted_proba: prediction.predicted_proba,
        }
    }

    /// The values a patient carries before any prediction.
    pub fn not_available() -> Self {
        Self::from_prediction(&Prediction::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_risk_boundaries() {
        assert_eq!(classify_risk(Some(0.05)), RiskLabel::Low);
        assert_eq!(classify_risk(Some(0.10)), RiskLabel::Medium);
        assert_eq!(classify_risk(Some(0.199)), RiskLabel::Medium);
        assert_eq!(classify_risk(Some(0.2)), RiskLabel::High);
        assert_eq!(classify_risk(Some(0.95)), RiskLabel::High);
    }

    #[test]
    fn test_classify_risk_non_numeric() {
        assert_eq!(classify_risk(Some(f64::NAN)), RiskLabel::NotAvailable);
        assert_eq!(classify_risk(Some(f64::INFINITY)), RiskLabel::NotAvailable);
        assert_eq!(classify_risk(None), RiskLabel::NotAvailable);
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(Some(0.153)), "15.3%");
        assert_eq!(format_pct(Some(0.23)), "23.0%");
        assert_eq!(format_pct(Some(0.0)), "0.0%");
        assert_eq!(format_pct(Some(1.0)), "100.0%");
        assert_eq!(format_pct(None), "N/A");
        assert_eq!(format_pct(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_label_strings() {
        for label in [
            RiskLabel::Low,
            RiskLabel::Medium,
            RiskLabel::High,
            RiskLabel::NotAvailable,
        ] {
            assert_eq!(RiskLabel::from_label(label.as_str()), Some(label));
        }
        assert_eq!(RiskLabel::from_label("Moderate"), None);
        assert_eq!(
            serde_json::to_string(&RiskLabel::NotAvailable).unwrap(),
            "\"N/A\""
        );
    }

    #[test]
    fn test_assessment_from_prediction() {
        let assessment =
            RiskAssessment::from_prediction(&Prediction::new(Some(json!(1)), Some(0.23)));
        assert_eq!(assessment.label, RiskLabel::High);
        assert_eq!(assessment.pct, "23.0%");
        assert_eq!(assessment.color, "#e53935");
        assert_eq!(assessment.predicted_class, Some(json!(1)));
    }

    #[test]
    fn test_assessment_not_available() {
        let assessment = RiskAssessment::not_available();
        assert_eq!(assessment.label, RiskLabel::NotAvailable);
        assert_eq!(assessment.pct, "N/A");
        assert_eq!(assessment.color, "#cccccc");
        assert_eq!(assessment.predicted_proba, None);
    }
}
