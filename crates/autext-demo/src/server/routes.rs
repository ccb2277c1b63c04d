use crate::models::{DetectRequest, DetectResponse, ErrorResponse};
use crate::state::AppState;
use autext_core::{Error, Language};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.detector.registry();
    Json(serde_json::json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "enabled_languages": state.detector.languages(),
        "loaded_languages": registry.loaded_languages(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

// ============================================================================
// Detection endpoints
// ============================================================================

pub async fn detect(
    State(state): State<AppState>,
    Json(req): Json<DetectRequest>,
) -> Response {
    match state.detector.analyze(&req.text).await {
        Ok(result) => {
            let response = DetectResponse::new(&result, req.show_details);
            info!(
                request_id = response.request_id.as_str(),
                language = response.language.as_str(),
                paragraphs = response.analyzed_paragraphs,
                ai_content_percentage = response.ai_content_percentage,
                "Detection served"
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub enabled: bool,
    pub loaded: bool,
}

pub async fn languages(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.detector.registry();
    let infos: Vec<LanguageInfo> = Language::ALL
        .into_iter()
        .map(|language| LanguageInfo {
            code: language.code(),
            name: language.name(),
            enabled: state.detector.languages().contains(&language),
            loaded: registry.is_loaded(language),
        })
        .collect();
    Json(infos)
}

// ============================================================================
// Error mapping
// ============================================================================

/// Maps pipeline errors onto HTTP responses
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message shown to the user
    pub fn message(&self) -> String {
        match &self.0 {
            Error::Validation(reason) => reason.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.message(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            error!(request_id = body.request_id.as_str(), error = %self.0, "Detection failed");
        } else {
            warn!(request_id = body.request_id.as_str(), error = %self.0, "Detection rejected");
        }

        (status, Json(body)).into_response()
    }
}
