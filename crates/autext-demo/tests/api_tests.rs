//! HTTP API tests against the router with mocked models

use async_trait::async_trait;
use autext_classifiers::{
    Classifier, Detection, Detector, EncodedSequence, Encoder, LanguageIdentifier, LanguageModel,
    ModelLoader, ModelRegistry, Vocabulary,
};
use autext_core::{Error, Language, Result};
use autext_demo::{build_app, AppState, DetectResponse, ErrorResponse, Highlight};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Scores paragraphs containing "generado" as AI, everything else as human
struct MarkerClassifier;

impl Classifier for MarkerClassifier {
    fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        Ok(if sequence.ids().contains(&2) { 0.995 } else { 0.1 })
    }

    fn name(&self) -> &str {
        "marker"
    }
}

struct TestLoader {
    fail: bool,
}

#[async_trait]
impl ModelLoader for TestLoader {
    async fn load(&self, language: Language) -> Result<LanguageModel> {
        if self.fail {
            return Err(Error::load(format!("no artifact for {}", language)));
        }
        let vocabulary =
            Vocabulary::from_json(r#"{"<pad>": 0, "<unk>": 1, "generado": 2}"#)?;
        Ok(LanguageModel::new(
            Arc::new(MarkerClassifier),
            Arc::new(vocabulary),
        ))
    }

    fn available_languages(&self) -> Vec<Language> {
        Language::ALL.to_vec()
    }
}

struct SpanishIdentifier;

impl LanguageIdentifier for SpanishIdentifier {
    fn identify(&self, _text: &str) -> Result<Detection> {
        Ok(Detection {
            code: "es".to_string(),
            confidence: 1.0,
        })
    }
}

fn app(fail: bool) -> Router {
    let detector = Detector::new(
        Arc::new(SpanishIdentifier),
        Arc::new(ModelRegistry::new(Arc::new(TestLoader { fail }))),
        Encoder::default(),
        Language::ALL.to_vec(),
    )
    .unwrap();
    build_app(AppState::new(Arc::new(detector), None))
}

fn detect_request(text: &str, show_details: bool) -> Request<Body> {
    let body = serde_json::json!({ "text": text, "show_details": show_details });
    Request::builder()
        .method("POST")
        .uri("/api/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn long_text() -> String {
    let ai = "Este texto fue generado por un modelo de lenguaje que escribe párrafos muy \
        largos y correctos sobre cualquier tema que se le pida, sin errores ni dudas.";
    let human = "Ayer fui al mercado con mi abuela y compramos tomates, pan y un poco de queso \
        para la cena de los domingos, que siempre es la más tranquila de la semana.";
    format!("{}\n\n{}", ai, human)
}

#[tokio::test]
async fn test_detect_highlights_paragraphs() {
    let text = long_text();
    assert!(text.chars().count() > 250);

    let response = app(false)
        .oneshot(detect_request(&text, true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: DetectResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.language, "es");
    assert_eq!(body.paragraphs.len(), 2);
    assert_eq!(body.paragraphs[0].highlight, Highlight::Red);
    assert_eq!(body.paragraphs[1].highlight, Highlight::Green);
    assert_eq!(body.paragraphs[0].label.as_deref(), Some("Probability: 99%"));
    assert_eq!(body.ai_paragraphs, 1);
    assert_eq!(body.summary, "AI content percentage: 50.00%");
}

#[tokio::test]
async fn test_short_text_is_bad_request() {
    let response = app(false)
        .oneshot(detect_request("Muy corto.", false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.error, "Text must be longer than 250 characters.");
}

#[tokio::test]
async fn test_empty_text_is_bad_request() {
    let response = app(false).oneshot(detect_request("", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.starts_with("Please enter text with more than 250 characters"));
}

#[tokio::test]
async fn test_missing_text_is_empty_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.starts_with("Please enter text with more than 250 characters"));
}

#[tokio::test]
async fn test_load_failure_is_server_error() {
    let response = app(true)
        .oneshot(detect_request(&long_text(), false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.contains("no artifact for es"));
}

#[tokio::test]
async fn test_health_reports_loaded_languages() {
    let app = app(false);
    app.clone()
        .oneshot(detect_request(&long_text(), false))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["loaded_languages"], serde_json::json!(["es"]));
}

#[tokio::test]
async fn test_languages_endpoint_lists_all() {
    let response = app(false)
        .oneshot(Request::get("/api/languages").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["en", "es", "pt", "gl", "eu", "ca"]);
    assert!(body.as_array().unwrap().iter().all(|l| l["loaded"] == false));
}

#[tokio::test]
async fn test_index_page_is_served() {
    let response = app(false)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Detect AI Content"));
    assert!(html.contains("More details"));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = app(false)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
