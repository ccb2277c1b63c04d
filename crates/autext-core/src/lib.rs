//! autext Core
//!
//! Core types and utilities shared across autext components.
//!
//! This crate provides:
//! - The closed set of supported languages
//! - Paragraph scores, verdicts and per-request results
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result, ValidationError};
pub use types::{
    Language, ParagraphScore, SessionResult, Verdict, AI_THRESHOLD_PERCENT, MAX_SEQUENCE_LENGTH,
    MIN_TEXT_CHARS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, ValidationError};
    pub use crate::types::{Language, ParagraphScore, SessionResult, Verdict};
}
