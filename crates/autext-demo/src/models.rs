//! Request and response bodies of the JSON API

use autext_core::{ParagraphScore, SessionResult, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/detect`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Missing text is treated as empty and rejected by validation
    #[serde(default)]
    pub text: String,

    /// Include per-paragraph probability labels
    #[serde(default)]
    pub show_details: bool,
}

/// Highlight colour of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Red,
    Green,
}

impl From<Verdict> for Highlight {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Ai => Self::Red,
            Verdict::Human => Self::Green,
        }
    }
}

/// One scored paragraph as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphView {
    pub index: usize,
    pub text: String,
    pub verdict: Verdict,
    pub highlight: Highlight,

    /// AI probability in percent
    pub ai_probability: f32,

    /// "Probability: N%" when details were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ParagraphView {
    pub fn new(score: &ParagraphScore, show_details: bool) -> Self {
        Self {
            index: score.index,
            text: score.text.clone(),
            verdict: score.verdict,
            highlight: score.verdict.into(),
            ai_probability: score.ai_probability,
            label: show_details.then(|| probability_label(score.ai_probability)),
        }
    }
}

/// Response of `POST /api/detect`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub language: String,
    pub language_name: String,
    pub paragraphs: Vec<ParagraphView>,
    pub ai_paragraphs: usize,
    pub analyzed_paragraphs: usize,
    pub ai_content_percentage: f64,

    /// "AI content percentage: XX.XX%", or a notice when nothing was analyzable
    pub summary: String,
    pub latency_ms: f64,
}

impl DetectResponse {
    pub fn new(result: &SessionResult, show_details: bool) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            language: result.language.code().to_string(),
            language_name: result.language.name().to_string(),
            paragraphs: result
                .paragraphs
                .iter()
                .map(|p| ParagraphView::new(p, show_details))
                .collect(),
            ai_paragraphs: result.ai_paragraphs,
            analyzed_paragraphs: result.analyzed_paragraphs(),
            ai_content_percentage: result.ai_content_percentage,
            summary: summary_line(result),
            latency_ms: result.latency_us as f64 / 1000.0,
        }
    }
}

/// Error body for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub request_id: String,
}

/// "Probability: N%" with N the truncated integer percentage
pub fn probability_label(ai_probability: f32) -> String {
    format!("Probability: {}%", ai_probability.trunc() as u32)
}

/// Text shown below the paragraphs
pub fn summary_line(result: &SessionResult) -> String {
    if result.is_empty() {
        NO_CONTENT.to_string()
    } else {
        format!(
            "AI content percentage: {:.2}%",
            result.ai_content_percentage
        )
    }
}

pub const LEGEND: &str =
    "AI-generated paragraphs are highlighted in red, human-generated paragraphs are in green.";

pub const NO_CONTENT: &str = "The text has no analyzable content.";

#[cfg(test)]
mod tests {
    use super::*;
    use autext_core::Language;

    fn result(probabilities: &[f32]) -> SessionResult {
        let scores = probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| ParagraphScore::new(i, format!("paragraph {}", i), *p))
            .collect();
        SessionResult::from_scores(Language::Ca, scores, 1500)
    }

    #[test]
    fn test_request_defaults() {
        let req: DetectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_empty());
        assert!(!req.show_details);
    }

    #[test]
    fn test_probability_label_truncates() {
        assert_eq!(probability_label(99.99), "Probability: 99%");
        assert_eq!(probability_label(100.0), "Probability: 100%");
        assert_eq!(probability_label(0.4), "Probability: 0%");
    }

    #[test]
    fn test_summary_two_decimals() {
        let r = result(&[0.999, 0.1, 0.2]);
        assert_eq!(summary_line(&r), "AI content percentage: 33.33%");
    }

    #[test]
    fn test_summary_without_paragraphs() {
        assert_eq!(summary_line(&result(&[])), NO_CONTENT);
    }

    #[test]
    fn test_response_details() {
        let r = result(&[0.995, 0.5]);

        let plain = DetectResponse::new(&r, false);
        assert!(plain.paragraphs.iter().all(|p| p.label.is_none()));

        let detailed = DetectResponse::new(&r, true);
        assert_eq!(detailed.language, "ca");
        assert_eq!(detailed.language_name, "Catalan");
        assert_eq!(detailed.paragraphs[0].highlight, Highlight::Red);
        assert_eq!(detailed.paragraphs[1].highlight, Highlight::Green);
        assert_eq!(detailed.paragraphs[0].label.as_deref(), Some("Probability: 99%"));
        assert_eq!(detailed.analyzed_paragraphs, 2);
        assert_eq!(detailed.latency_ms, 1.5);
    }
}
