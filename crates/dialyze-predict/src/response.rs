//! Inference endpoint response parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PredictError, PredictResult};

/// Raw output of one model invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Opaque class identifier as returned by the model
    pub predicted_class: Option<Value>,
    /// Probability of AKI in [0, 1]
    pub predicted_proba: Option<f64>,
}

impl Prediction {
    pub fn new(predicted_class: Option<Value>, predicted_proba: Option<f64>) -> Self {
        Self {
            predicted_class,
            predicted_proba,
        }
    }
}

/// Parse the endpoint body.
///
/// The model answers with an array of `{PredictedClass, PredictedProba}`
/// objects; only the first one is used. An empty array or any other shape
/// yields an empty prediction. A body that is not JSON at all is an error.
pub fn parse_prediction_response(body: &str) -> PredictResult<Prediction> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|_| PredictError::InvalidJson(body.to_string()))?;

    let Some(first) = parsed.as_array().and_then(|items| items.first()) else {
        return Ok(Prediction::default());
    };
    let Some(obj) = first.as_object() else {
        return Ok(Prediction::default());
    };

    let predicted_class = obj.get("PredictedClass").filter(|v| !v.is_null()).cloned();
    let predicted_proba = obj.get("PredictedProba").and_then(Value::as_f64);

    Ok(Prediction {
        predicted_class,
        predicted_proba,
    })
}
