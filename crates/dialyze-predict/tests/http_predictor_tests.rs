//! HTTP predictor tests against a local stand-in for the inference endpoint.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use dialyze_predict::{
    FeatureVector, HttpPredictor, LabField, PredictError, Predictor, PredictorConfig,
};

type Captured = Arc<Mutex<Option<Value>>>;

async fn spawn_endpoint(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/invocations", addr)
}

fn predictor_for(url: &str) -> HttpPredictor {
    let config = PredictorConfig::new(url).unwrap();
    HttpPredictor::new(&config).unwrap()
}

fn full_panel() -> BTreeMap<String, String> {
    LabField::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| (f.key().to_string(), format!("{}.5", i + 1)))
        .collect()
}

#[tokio::test]
async fn test_posts_feature_vector_and_parses_prediction() {
    let captured: Captured = Arc::new(Mutex::new(None));

    async fn handler(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        *captured.lock().unwrap() = Some(body);
        Json(json!([{"PredictedClass": 1, "PredictedProba": 0.23}]))
    }

    let app = Router::new()
        .route("/invocations", post(handler))
        .with_state(captured.clone());
    let url = spawn_endpoint(app).await;

    let features = FeatureVector::from_lab_values(&full_panel());
    let prediction = predictor_for(&url).predict(&features).await.unwrap();

    assert_eq!(prediction.predicted_class, Some(json!(1)));
    assert_eq!(prediction.predicted_proba, Some(0.23));

    let body = captured.lock().unwrap().clone().unwrap();
    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 12);
    assert_eq!(obj["HCO3"], json!(1.5));
    assert_eq!(obj["Glasgow"], json!(12.5));
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let app = Router::new().route(
        "/invocations",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let url = spawn_endpoint(app).await;

    let features = FeatureVector::from_lab_values(&full_panel());
    let err = predictor_for(&url).predict(&features).await.unwrap_err();

    match err {
        PredictError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model crashed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let app = Router::new().route("/invocations", post(|| async { "not json" }));
    let url = spawn_endpoint(app).await;

    let features = FeatureVector::from_lab_values(&full_panel());
    let err = predictor_for(&url).predict(&features).await.unwrap_err();
    assert!(matches!(err, PredictError::InvalidJson(_)));
}

#[tokio::test]
async fn test_empty_array_yields_empty_prediction() {
    let app = Router::new().route("/invocations", post(|| async { Json(json!([])) }));
    let url = spawn_endpoint(app).await;

    let features = FeatureVector::from_lab_values(&full_panel());
    let prediction = predictor_for(&url).predict(&features).await.unwrap();
    assert_eq!(prediction.predicted_class, None);
    assert_eq!(prediction.predicted_proba, None);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let features = FeatureVector::from_lab_values(&full_panel());
    let err = predictor_for(&format!("http://{}/invocations", addr))
        .predict(&features)
        .await
        .unwrap_err();
    assert!(matches!(err, PredictError::Transport(_)));
}
