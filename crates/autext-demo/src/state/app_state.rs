use autext_classifiers::Detector;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Detection pipeline, including the per-language model cache
    pub detector: Arc<Detector>,

    /// Prometheus handle for rendering `/metrics`; absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,

    /// Server start time, reported by `/health`
    pub started_at: Instant,
}

impl AppState {
    pub fn new(detector: Arc<Detector>, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            detector,
            metrics_handle,
            started_at: Instant::now(),
        }
    }
}
