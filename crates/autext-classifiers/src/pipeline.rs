//! Paragraph detection pipeline
//!
//! One [`Detector::analyze`] call runs, in order:
//! - input validation (nothing else happens for rejected text)
//! - language identification over the enabled languages
//! - model acquisition from the shared [`ModelRegistry`]
//! - blank-line paragraph split, then per-paragraph encode and score
//! - aggregation into a [`SessionResult`]

use crate::config::DetectorConfig;
use crate::encoder::Encoder;
use crate::language::{LanguageIdentifier, ProfileIdentifier};
use crate::model_loader::CandleModelLoader;
use crate::registry::ModelRegistry;
use autext_core::{
    Error, Language, ParagraphScore, Result, SessionResult, ValidationError, MAX_SEQUENCE_LENGTH,
    MIN_TEXT_CHARS,
};
use metrics::{counter, histogram};
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A newline, optional horizontal whitespace, and another newline
const PARAGRAPH_BREAK: &str = r"\r?\n[ \t]*\r?\n";

/// Detects AI-generated paragraphs in free-form text
pub struct Detector {
    identifier: Arc<dyn LanguageIdentifier>,
    registry: Arc<ModelRegistry>,
    encoder: Encoder,
    languages: Vec<Language>,
    paragraph_break: Regex,
}

impl Detector {
    /// Create a detector accepting only `languages`
    pub fn new(
        identifier: Arc<dyn LanguageIdentifier>,
        registry: Arc<ModelRegistry>,
        encoder: Encoder,
        languages: Vec<Language>,
    ) -> Result<Self> {
        if languages.is_empty() {
            return Err(Error::config("detector needs at least one language"));
        }

        Ok(Self {
            identifier,
            registry,
            encoder,
            languages,
            paragraph_break: Regex::new(PARAGRAPH_BREAK)
                .map_err(|e| Error::config(format!("Failed to compile paragraph regex: {}", e)))?,
        })
    }

    /// Wire the built-in identifier and the Candle loader from configuration
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;

        let identifier = Arc::new(ProfileIdentifier::new(&config.languages)?);
        let loader = Arc::new(CandleModelLoader::from_config(config)?);
        let registry = Arc::new(ModelRegistry::new(loader));

        info!(
            languages = ?config.languages,
            configured_models = config.models.len(),
            "Detector initialized"
        );

        Self::new(
            identifier,
            registry,
            Encoder::new(MAX_SEQUENCE_LENGTH)?,
            config.languages.clone(),
        )
    }

    /// Shared model cache
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Enabled languages
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Reject empty text and text of at most [`MIN_TEXT_CHARS`] characters
    pub fn validate(text: &str) -> std::result::Result<(), ValidationError> {
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        let chars = text.chars().count();
        if chars <= MIN_TEXT_CHARS {
            return Err(ValidationError::TooShort { chars });
        }
        Ok(())
    }

    /// Non-empty, trimmed paragraphs in input order
    pub fn split_paragraphs<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.paragraph_break
            .split(text)
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .collect()
    }

    /// Identify the language of `text`, restricted to the enabled set
    pub fn detect_language(&self, text: &str) -> Result<Language> {
        let detection = self.identifier.identify(text)?;
        let language = Language::from_code(&detection.code)?;
        if !self.languages.contains(&language) {
            return Err(Error::unsupported_language(detection.code));
        }
        Ok(language)
    }

    /// Run the full detection pipeline over `text`
    pub async fn analyze(&self, text: &str) -> Result<SessionResult> {
        let started = Instant::now();
        counter!("autext_requests_total").increment(1);

        Self::validate(text)?;

        let language = self.detect_language(text)?;
        let model = self.registry.get(language).await?;

        let mut scores = Vec::new();
        for (index, paragraph) in self.split_paragraphs(text).into_iter().enumerate() {
            let sequence = self.encoder.encode(paragraph, model.vocabulary());
            let probability = model.classifier().score(&sequence)?;
            let score = ParagraphScore::new(index, paragraph, probability);

            debug!(
                index,
                tokens = sequence.token_count(),
                truncated = sequence.truncated(),
                ai_probability = score.ai_probability,
                verdict = score.verdict.as_str(),
                "Scored paragraph"
            );
            counter!("autext_paragraphs_total", "verdict" => score.verdict.as_str()).increment(1);

            scores.push(score);
        }

        let latency_us = started.elapsed().as_micros() as u64;
        histogram!("autext_pipeline_latency_us").record(latency_us as f64);

        let result = SessionResult::from_scores(language, scores, latency_us);
        info!(
            language = language.code(),
            paragraphs = result.analyzed_paragraphs(),
            ai_paragraphs = result.ai_paragraphs,
            ai_content_percentage = result.ai_content_percentage,
            latency_us,
            "Analysis complete"
        );

        Ok(result)
    }
}
