//! Core types for autext

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inputs must be strictly longer than this many characters
pub const MIN_TEXT_CHARS: usize = 250;

/// Fixed width of every encoded sequence fed to a classifier
pub const MAX_SEQUENCE_LENGTH: usize = 62;

/// A paragraph is AI-generated when its probability (percent) is above this.
///
/// The boundary is exclusive: exactly 99.0 is classified as human.
pub const AI_THRESHOLD_PERCENT: f32 = 99.0;

/// Languages with a trained classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Pt,
    Gl,
    Eu,
    Ca,
}

impl Language {
    /// Every supported language, in slot order
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Es,
        Language::Pt,
        Language::Gl,
        Language::Eu,
        Language::Ca,
    ];

    /// Two-letter ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Pt => "pt",
            Self::Gl => "gl",
            Self::Eu => "eu",
            Self::Ca => "ca",
        }
    }

    /// English name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::Pt => "Portuguese",
            Self::Gl => "Galician",
            Self::Eu => "Basque",
            Self::Ca => "Catalan",
        }
    }

    /// Stable position of this language in [`Language::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a two-letter code, rejecting anything outside the supported set
    pub fn from_code(code: &str) -> Result<Self> {
        code.parse()
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            "pt" => Ok(Self::Pt),
            "gl" => Ok(Self::Gl),
            "eu" => Ok(Self::Eu),
            "ca" => Ok(Self::Ca),
            _ => Err(Error::unsupported_language(s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-paragraph decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Human,
    Ai,
}

impl Verdict {
    /// Apply the fixed decision threshold to a percentage in [0, 100]
    pub fn from_percentage(percentage: f32) -> Self {
        if percentage > AI_THRESHOLD_PERCENT {
            Self::Ai
        } else {
            Self::Human
        }
    }

    /// Returns true if this verdict is AI
    pub fn is_ai(&self) -> bool {
        matches!(self, Self::Ai)
    }

    /// Lowercase label, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => f.write_str("Human"),
            Self::Ai => f.write_str("AI"),
        }
    }
}

/// Score of a single non-empty paragraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphScore {
    /// Position among the analyzed (non-empty) paragraphs
    pub index: usize,

    /// Paragraph text, trimmed
    pub text: String,

    /// Probability of AI authorship, in percent (0.0-100.0)
    pub ai_probability: f32,

    /// Decision derived from `ai_probability`
    pub verdict: Verdict,
}

impl ParagraphScore {
    /// Build a score from a raw classifier probability in [0, 1]
    pub fn new(index: usize, text: impl Into<String>, probability: f32) -> Self {
        let ai_probability = (probability * 100.0).clamp(0.0, 100.0);
        Self {
            index,
            text: text.into(),
            ai_probability,
            verdict: Verdict::from_percentage(ai_probability),
        }
    }
}

/// Outcome of one detection request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Language the text was classified in
    pub language: Language,

    /// Scores in input order
    pub paragraphs: Vec<ParagraphScore>,

    /// Number of paragraphs classified as AI
    pub ai_paragraphs: usize,

    /// Share of AI paragraphs in percent; 0.0 when nothing was analyzable
    pub ai_content_percentage: f64,

    /// Total pipeline latency in microseconds
    pub latency_us: u64,
}

impl SessionResult {
    /// Aggregate paragraph scores into a result
    pub fn from_scores(language: Language, paragraphs: Vec<ParagraphScore>, latency_us: u64) -> Self {
        let ai_paragraphs = paragraphs.iter().filter(|p| p.verdict.is_ai()).count();
        let ai_content_percentage = if paragraphs.is_empty() {
            0.0
        } else {
            100.0 * ai_paragraphs as f64 / paragraphs.len() as f64
        };

        Self {
            language,
            paragraphs,
            ai_paragraphs,
            ai_content_percentage,
            latency_us,
        }
    }

    /// Number of non-empty paragraphs that were scored
    pub fn analyzed_paragraphs(&self) -> usize {
        self.paragraphs.len()
    }

    /// True when the text had no analyzable paragraph
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}
