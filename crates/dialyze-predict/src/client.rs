//! Predictor implementations.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::ACCEPT;

use crate::config::PredictorConfig;
use crate::request::FeatureVector;
use crate::response::{parse_prediction_response, Prediction};
use crate::{PredictError, PredictResult};

/// Something that turns a feature vector into a prediction.
pub trait Predictor: Send + Sync {
    fn predict(
        &self,
        features: &FeatureVector,
    ) -> impl Future<Output = PredictResult<Prediction>> + Send;
}

/// Calls the remote inference endpoint over HTTP(S).
///
/// One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpPredictor {
    pub fn new(config: &PredictorConfig) -> PredictResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint_url: config.endpoint_url().to_string(),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl Predictor for HttpPredictor {
    async fn predict(&self, features: &FeatureVector) -> PredictResult<Prediction> {
        tracing::debug!(endpoint = %self.endpoint_url, "invoking inference endpoint");

        let response = self
            .client
            .post(&self.endpoint_url)
            .header(ACCEPT, "application/json")
            .json(features)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "inference endpoint rejected request");
            return Err(PredictError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_prediction_response(&body)
    }
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Success(Prediction),
    Failure(String),
}

/// Scripted predictor for testing without a live endpoint.
#[derive(Debug)]
pub struct MockPredictor {
    outcome: MockOutcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockPredictor {
    /// Always answer with the given prediction.
    pub fn returning(prediction: Prediction) -> Self {
        Self {
            outcome: MockOutcome::Success(prediction),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with a backend error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Failure(message.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of predictions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for MockPredictor {
    async fn predict(&self, _features: &FeatureVector) -> PredictResult<Prediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            MockOutcome::Success(prediction) => Ok(prediction.clone()),
            MockOutcome::Failure(message) => Err(PredictError::Backend(message.clone())),
        }
    }
}
