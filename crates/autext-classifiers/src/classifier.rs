//! Classifier trait and common types

use crate::encoder::EncodedSequence;
use autext_core::Result;

/// Trait for all paragraph classifiers
///
/// Implementations must be pure with respect to the input: the same encoded
/// sequence always yields the same probability, and scoring never mutates
/// the model.
pub trait Classifier: Send + Sync {
    /// Probability in [0, 1] that the encoded paragraph is AI-generated
    fn score(&self, sequence: &EncodedSequence) -> Result<f32>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Class probabilities produced by a two-way softmax
/// 0: P(Human), 1: P(AI)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities(f32, f32);

impl ClassProbabilities {
    /// Build from the softmax output, clamping each class into [0, 1]
    pub fn new(human: f32, ai: f32) -> Self {
        Self(sanitize(human), sanitize(ai))
    }

    pub fn human(&self) -> f32 {
        self.0
    }

    pub fn ai(&self) -> f32 {
        self.1
    }
}

impl TryFrom<Vec<f32>> for ClassProbabilities {
    type Error = autext_core::Error;

    fn try_from(probs: Vec<f32>) -> Result<Self> {
        match probs.as_slice() {
            [human, ai] => Ok(Self::new(*human, *ai)),
            other => Err(autext_core::Error::classifier(format!(
                "expected 2 class probabilities, got {}",
                other.len()
            ))),
        }
    }
}

fn sanitize(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
