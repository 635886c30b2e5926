//! Request body for the inference endpoint.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::labs::LabField;

/// Parse the leading number of a lab entry.
///
/// Lab values are free text such as `"2.5 mg/dL"`, so this reads the longest
/// numeric prefix (sign, digits, fraction, exponent) after leading whitespace
/// and ignores the rest. Returns `None` when there is no numeric prefix or the
/// result is not finite.
pub fn parse_lab_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The 12-key feature vector posted to the model.
///
/// Every vocabulary key is always present; unparseable or missing entries
/// serialize as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [Option<f64>; 12],
}

impl FeatureVector {
    /// Build from a patient's raw lab strings. Keys outside the vocabulary are ignored.
    pub fn from_lab_values(lab_values: &BTreeMap<String, String>) -> Self {
        let mut values = [None; 12];
        for (slot, field) in values.iter_mut().zip(LabField::ALL) {
            *slot = lab_values
                .get(field.key())
                .and_then(|raw| parse_lab_number(raw));
        }
        Self { values }
    }

    /// Value for a single field.
    pub fn get(&self, field: LabField) -> Option<f64> {
        LabField::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.values[i])
    }

    /// Iterate fields with their parsed values, in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (LabField, Option<f64>)> + '_ {
        LabField::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Serialize to the JSON body string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LabField::ALL.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_lab_number("2.0"), Some(2.0));
        assert_eq!(parse_lab_number("  7.35"), Some(7.35));
        assert_eq!(parse_lab_number("-3"), Some(-3.0));
        assert_eq!(parse_lab_number(".5"), Some(0.5));
        assert_eq!(parse_lab_number("5."), Some(5.0));
        assert_eq!(parse_lab_number("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_with_trailing_text() {
        assert_eq!(parse_lab_number("2.5 mg/dL"), Some(2.5));
        assert_eq!(parse_lab_number("40mg"), Some(40.0));
        assert_eq!(parse_lab_number("1.2.3"), Some(1.2));
        assert_eq!(parse_lab_number("3e"), Some(3.0));
        assert_eq!(parse_lab_number("3e+x"), Some(3.0));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(parse_lab_number(""), None);
        assert_eq!(parse_lab_number("   "), None);
        assert_eq!(parse_lab_number("abc"), None);
        assert_eq!(parse_lab_number("."), None);
        assert_eq!(parse_lab_number("-"), None);
        assert_eq!(parse_lab_number("mg 2.5"), None);
    }

    #[test]
    fn test_feature_vector_has_all_keys() {
        let mut labs = BTreeMap::new();
        labs.insert("Creatinine".to_string(), "2.0".to_string());
        labs.insert("pH".to_string(), "n/a".to_string());
        labs.insert("BUN".to_string(), "40".to_string());

        let features = FeatureVector::from_lab_values(&labs);
        assert_eq!(features.get(LabField::Creatinine), Some(2.0));
        assert_eq!(features.get(LabField::Ph), None);

        let json: serde_json::Value =
            serde_json::from_str(&features.to_json().unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 12);
        assert!(!obj.contains_key("BUN"));
        assert_eq!(obj["Creatinine"], serde_json::json!(2.0));
        assert!(obj["pH"].is_null());
        assert!(obj["Mean Arterial Pressure"].is_null());
    }

    #[test]
    fn test_feature_vector_key_order() {
        let json = FeatureVector::from_lab_values(&BTreeMap::new())
            .to_json()
            .unwrap();
        assert!(json.starts_with("{\"HCO3\":null,\"Creatinine\":null"));
        assert!(json.ends_with("\"Glasgow\":null}"));
    }
}
