//! Router tests against the shipped model

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use beanclass_classifiers::{Classifier, ModelMetadata};
use beanclass_core::{ClassLabel, FeatureMatrix, Probabilities, Result, FEATURE_SCHEMA};
use beanclass_server::config::ServerConfig;
use beanclass_server::server::build_app;
use beanclass_server::state::AppState;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const SHIPPED_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/bean_forest.json");

const LARGE_BEAN: &str =
    "200000,1700,650,540,1.2,0.55,210000,505,0.78,0.98,0.87,0.85,0.0032,0.0008,0.9,0.99";

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.classifier.model_path = PathBuf::from(SHIPPED_MODEL);
    config
}

fn app_with(config: ServerConfig) -> Router {
    let metrics = PrometheusBuilder::new().build_recorder().handle();
    build_app(AppState::new(config, metrics).unwrap())
}

fn app() -> Router {
    app_with(test_config())
}

fn header_line() -> String {
    FEATURE_SCHEMA
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(",")
}

fn default_line() -> String {
    FEATURE_SCHEMA
        .iter()
        .map(|f| f.default)
        .collect::<Vec<_>>()
        .join(",")
}

fn default_values() -> Vec<String> {
    FEATURE_SCHEMA.iter().map(|f| f.default.to_string()).collect()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn csv_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_schema() {
    let response = app()
        .oneshot(Request::get("/api/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let schema = body_json(response).await;
    let fields = schema["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 16);
    assert_eq!(fields[0]["name"], "Area");
    assert_eq!(fields[0]["default"], "40100");
    assert_eq!(fields[15]["name"], "ShapeFactor4");
    assert_eq!(schema["classes"].as_array().unwrap().len(), 7);
    assert_eq!(schema["classes"][0], "BARBUNYA");
    assert_eq!(schema["model"]["n_trees"], 3);
    assert_eq!(schema["confidence"], "per-row");
}

#[tokio::test]
async fn test_single_prediction_with_defaults() {
    let response = app()
        .oneshot(json_request(
            "/api/predict",
            json!({ "values": default_values() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["predictions"], json!([{ "label": "SEKER", "confidence": 80.0 }]));
    assert_eq!(
        body["summary"],
        "The predicted class is SEKER with a confidence of: 80%"
    );
    assert_eq!(body["download_csv"], "labels,confidence\nSEKER,80.0\n");
    assert_eq!(body["cached"], false);
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn test_repeated_submission_is_cached() {
    let app = app();
    let request = || json_request("/api/predict", json!({ "values": default_values() }));

    let first = body_json(app.clone().oneshot(request()).await.unwrap()).await;
    let second = body_json(app.oneshot(request()).await.unwrap()).await;

    assert_eq!(first["cached"], false);
    assert_eq!(second["cached"], true);
    assert_eq!(first["predictions"], second["predictions"]);
}

#[tokio::test]
async fn test_named_fields() {
    let fields: serde_json::Map<String, Value> = FEATURE_SCHEMA
        .iter()
        .map(|f| (f.name.to_string(), Value::from(f.default)))
        .collect();
    let response = app()
        .oneshot(json_request("/api/predict", json!({ "fields": fields })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["predictions"][0]["label"], "SEKER");
}

#[tokio::test]
async fn test_blank_field_rejected() {
    let mut values = default_values();
    values[5] = String::new();
    values[9] = "abc".to_string();

    let response = app()
        .oneshot(json_request("/api/predict", json!({ "values": values })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "One or more fields are left blank!");
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_non_numeric_field_rejected() {
    let mut values = default_values();
    values[0] = "abc".to_string();

    let response = app()
        .oneshot(json_request("/api/predict", json!({ "values": values })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"]["message"],
        "Only int or float values are allowed!"
    );
}

#[tokio::test]
async fn test_malformed_json() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"]["type"],
        "invalid_request_error"
    );
}

#[tokio::test]
async fn test_batch_upload() {
    let csv = format!("{}\n{}\n{}\n", header_line(), default_line(), LARGE_BEAN);
    let response = app()
        .oneshot(csv_request("/api/predict/batch", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["predictions"],
        json!([
            { "label": "SEKER", "confidence": 80.0 },
            { "label": "BOMBAY", "confidence": 33.33 }
        ])
    );
    assert!(body.get("summary").is_none());
    assert_eq!(
        body["download_csv"],
        "labels,confidence\nSEKER,80.0\nBOMBAY,33.33\n"
    );
}

#[tokio::test]
async fn test_batch_upload_legacy_confidence() {
    let mut config = test_config();
    config.classifier.confidence = beanclass_classifiers::ConfidenceMode::BatchMax;

    let csv = format!("{}\n{}\n{}\n", header_line(), default_line(), LARGE_BEAN);
    let response = app_with(config)
        .oneshot(csv_request("/api/predict/batch", csv))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["predictions"][0]["confidence"], 80.0);
    assert_eq!(body["predictions"][1]["confidence"], 80.0);
    assert_eq!(body["predictions"][1]["label"], "BOMBAY");
}

#[tokio::test]
async fn test_header_only_batch_is_empty() {
    let response = app()
        .oneshot(csv_request("/api/predict/batch", header_line()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["predictions"], json!([]));
    assert!(body.get("download_csv").is_none());
}

#[tokio::test]
async fn test_csv_download() {
    let csv = format!("{}\n{}\n", header_line(), default_line());
    let response = app()
        .oneshot(csv_request("/api/predict/batch?format=csv", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"preds.csv\""
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(body_bytes(response).await, b"labels,confidence\nSEKER,80.0\n");
}

#[tokio::test]
async fn test_csv_download_suppressed_when_empty() {
    let response = app()
        .oneshot(csv_request("/api/predict/batch?format=csv", header_line()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_batch_with_bad_cell() {
    let csv = format!(
        "{}\n{}\n{}\n",
        header_line(),
        default_line(),
        default_line().replacen("40100", "big", 1)
    );
    let response = app()
        .oneshot(csv_request("/api/predict/batch", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "source_error");
    assert!(body.get("predictions").is_none());
}

#[tokio::test]
async fn test_upload_over_limit() {
    let mut config = test_config();
    config.max_upload_bytes = 64;

    let csv = format!("{}\n{}\n", header_line(), default_line());
    let response = app_with(config)
        .oneshot(csv_request("/api/predict/batch", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_url_rejects_other_schemes() {
    let response = app()
        .oneshot(json_request(
            "/api/predict/url",
            json!({ "url": "file:///etc/passwd" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "source_error");
}

fn served_csv() -> String {
    format!("{},Class\n{},SEKER\n", header_line(), LARGE_BEAN)
}

fn large_csv() -> String {
    let mut csv = header_line();
    for _ in 0..200 {
        csv.push('\n');
        csv.push_str(&default_line());
    }
    csv
}

/// Serve CSV files on an ephemeral local port
async fn serve_files() -> SocketAddr {
    let files = Router::new()
        .route("/feats.csv", get(|| async { served_csv() }))
        .route("/large.csv", get(|| async { large_csv() }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, files).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_url_fetch() {
    let addr = serve_files().await;

    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/predict/url",
            json!({ "url": format!("http://{}/feats.csv", addr) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["predictions"],
        json!([{ "label": "BOMBAY", "confidence": 33.33 }])
    );

    let missing = app
        .oneshot(json_request(
            "/api/predict/url",
            json!({ "url": format!("http://{}/missing.csv", addr) }),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_url_fetch_over_limit() {
    let addr = serve_files().await;
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    assert!(large_csv().len() > 1024);

    let app = app_with(config);
    for uri in ["/api/predict/url", "/api/preview/url"] {
        let response = app
            .clone()
            .oneshot(json_request(
                uri,
                json!({ "url": format!("http://{}/large.csv", addr) }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "source_error");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("exceeds 1024 bytes"));
    }

    let small = app
        .oneshot(json_request(
            "/api/predict/url",
            json!({ "url": format!("http://{}/feats.csv", addr) }),
        ))
        .await
        .unwrap();
    assert_eq!(small.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_preview_upload() {
    let csv = format!("{}\n{}\n{}\n", header_line(), default_line(), LARGE_BEAN);
    let response = app()
        .oneshot(csv_request("/api/preview/batch", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["columns"].as_array().unwrap().len(), 16);
    assert_eq!(body["columns"][0], "Area");
    assert_eq!(body["total_rows"], 2);
    assert_eq!(body["rows"][0][0], 40100.0);
    assert_eq!(body["rows"][1][0], 200000.0);
    assert!(body.get("predictions").is_none());
}

#[tokio::test]
async fn test_preview_reports_bad_cells() {
    let csv = format!(
        "{}\n{}\n",
        header_line(),
        default_line().replacen("40100", "big", 1)
    );
    let response = app()
        .oneshot(csv_request("/api/preview/batch", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "source_error");
}

#[tokio::test]
async fn test_preview_url() {
    let addr = serve_files().await;
    let response = app()
        .oneshot(json_request(
            "/api/preview/url",
            json!({ "url": format!("http://{}/feats.csv", addr) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["rows"][0][1], 1700.0);
}

#[tokio::test]
async fn test_no_cross_origin_headers() {
    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/predict")
        .header(header::ORIGIN, "http://localhost:8501")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(preflight).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let mut request = json_request("/api/predict", json!({ "values": default_values() }));
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://evil.example".parse().unwrap());
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_form_page_served() {
    for path in ["/", "/anything/else"] {
        let response = app()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Dry Bean Classifier"));
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

struct CountingClassifier {
    calls: AtomicU32,
}

impl Classifier for CountingClassifier {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(vec![ClassLabel::Cali; features.len()])
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Probabilities>> {
        Ok(vec![[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]; features.len()])
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[tokio::test]
async fn test_rejected_input_never_reaches_model() {
    let classifier = Arc::new(CountingClassifier {
        calls: AtomicU32::new(0),
    });
    let metadata = ModelMetadata {
        name: "counting".into(),
        version: "test".into(),
        n_trees: 0,
        n_features: 16,
        n_classes: 7,
        path: PathBuf::new(),
    };
    let state = AppState::with_classifier(
        ServerConfig::default(),
        classifier.clone(),
        metadata,
        PrometheusBuilder::new().build_recorder().handle(),
    )
    .unwrap();
    let app = build_app(state);

    let mut values = default_values();
    values[0] = String::new();
    let rejected = app
        .clone()
        .oneshot(json_request("/api/predict", json!({ "values": values })))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let empty = app
        .clone()
        .oneshot(csv_request("/api/predict/batch", header_line()))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::OK);

    let preview = app
        .clone()
        .oneshot(csv_request(
            "/api/preview/batch",
            format!("{}\n{}\n", header_line(), default_line()),
        ))
        .await
        .unwrap();
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(classifier.calls.load(Ordering::Relaxed), 0);

    let accepted = app
        .oneshot(json_request("/api/predict", json!({ "values": default_values() })))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
    assert_eq!(classifier.calls.load(Ordering::Relaxed), 1);
}
