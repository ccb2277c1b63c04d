//! Error types for autext

use crate::types::MIN_TEXT_CHARS;

/// Result type alias using autext's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for autext operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected before any detection work
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Model artifact or vocabulary could not be fetched or deserialized
    #[error("load error: {0}")]
    Load(String),

    /// Detected language is outside the supported set
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a new unsupported language error
    pub fn unsupported_language(code: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(code.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnsupportedLanguage(_))
    }
}

/// Reasons an input text is rejected before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No text at all
    #[error(
        "Please enter text with more than {} characters before detecting AI content.",
        MIN_TEXT_CHARS
    )]
    Empty,

    /// Text present but not longer than the minimum
    #[error("Text must be longer than {} characters.", MIN_TEXT_CHARS)]
    TooShort {
        /// Number of characters received
        chars: usize,
    },
}
