//! Convolutional text classifier over pretrained token embeddings
//!
//! Architecture (weights are produced by the training project):
//!
//! ```text
//! ids (1, L) -> embedding (1, L, E) -> transpose (1, E, L)
//!   -> for each filter width k: conv1d(E -> F_k, k) -> relu -> max over time (1, F_k)
//!   -> concat (1, ΣF) -> linear (1, 2) -> softmax -> P(AI)
//! ```
//!
//! Dropout is a training-time layer and has no effect here.

use crate::classifier::{ClassProbabilities, Classifier};
use crate::encoder::EncodedSequence;
use autext_core::{Error, Result};
use candle_core::{Device, Tensor, D};
use candle_nn::{Conv1d, Conv1dConfig, Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};

/// Shape of the trained network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnnArchitecture {
    /// Embedding width (FastText vectors are 300-dimensional)
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,

    /// Convolution widths, in tokens
    #[serde(default = "default_filter_sizes")]
    pub filter_sizes: Vec<usize>,

    /// Output channels per convolution
    #[serde(default = "default_num_filters")]
    pub num_filters: Vec<usize>,

    /// Output classes: human, AI
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

fn default_embed_dim() -> usize {
    300
}

fn default_filter_sizes() -> Vec<usize> {
    vec![3, 4, 5]
}

fn default_num_filters() -> Vec<usize> {
    vec![100, 100, 100]
}

fn default_num_classes() -> usize {
    2
}

impl Default for CnnArchitecture {
    fn default() -> Self {
        Self {
            embed_dim: default_embed_dim(),
            filter_sizes: default_filter_sizes(),
            num_filters: default_num_filters(),
            num_classes: default_num_classes(),
        }
    }
}

impl CnnArchitecture {
    /// Check the shape can run over sequences of `max_length` tokens
    pub fn validate(&self, max_length: usize) -> Result<()> {
        if self.filter_sizes.is_empty() {
            return Err(Error::config("architecture needs at least one filter size"));
        }
        if self.filter_sizes.len() != self.num_filters.len() {
            return Err(Error::config(format!(
                "{} filter sizes but {} filter counts",
                self.filter_sizes.len(),
                self.num_filters.len()
            )));
        }
        if self.num_classes != 2 {
            return Err(Error::config(format!(
                "classifier must have 2 output classes, got {}",
                self.num_classes
            )));
        }
        if let Some(widest) = self.filter_sizes.iter().max() {
            if *widest > max_length || *widest == 0 {
                return Err(Error::config(format!(
                    "filter width {} does not fit a {}-token window",
                    widest, max_length
                )));
            }
        }
        Ok(())
    }

    /// Width of the concatenated pooled feature vector
    pub fn feature_dim(&self) -> usize {
        self.num_filters.iter().sum()
    }
}

/// The network itself
pub struct TextCnn {
    embedding: Embedding,
    convs: Vec<Conv1d>,
    fc: Linear,
}

impl TextCnn {
    /// Build the network from weights named `embedding.*`, `conv1d_list.<i>.*`, `fc.*`
    pub fn load(
        vb: VarBuilder,
        vocab_size: usize,
        arch: &CnnArchitecture,
    ) -> candle_core::Result<Self> {
        let embedding = candle_nn::embedding(vocab_size, arch.embed_dim, vb.pp("embedding"))?;

        let conv_vb = vb.pp("conv1d_list");
        let convs = arch
            .filter_sizes
            .iter()
            .zip(&arch.num_filters)
            .enumerate()
            .map(|(i, (width, filters))| {
                candle_nn::conv1d(
                    arch.embed_dim,
                    *filters,
                    *width,
                    Conv1dConfig::default(),
                    conv_vb.pp(i),
                )
            })
            .collect::<candle_core::Result<Vec<_>>>()?;

        let fc = candle_nn::linear(arch.feature_dim(), arch.num_classes, vb.pp("fc"))?;

        Ok(Self {
            embedding,
            convs,
            fc,
        })
    }

    /// Logits of shape (batch, num_classes) for `input_ids` of shape (batch, L)
    pub fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let embedded = self.embedding.forward(input_ids)?;
        let channels_first = embedded.transpose(1, 2)?.contiguous()?;

        let pooled = self
            .convs
            .iter()
            .map(|conv| conv.forward(&channels_first)?.relu()?.max(D::Minus1))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let features = Tensor::cat(&pooled, 1)?;
        self.fc.forward(&features)
    }
}

/// [`Classifier`] backed by a [`TextCnn`]
pub struct CnnClassifier {
    name: String,
    model: TextCnn,
    device: Device,
}

impl CnnClassifier {
    pub fn new(name: impl Into<String>, model: TextCnn, device: Device) -> Self {
        Self {
            name: name.into(),
            model,
            device,
        }
    }

    /// Both class probabilities for one sequence
    pub fn probabilities(&self, sequence: &EncodedSequence) -> Result<ClassProbabilities> {
        let input_ids = Tensor::new(sequence.ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to create input tensor: {}", e)))?;

        let logits = self
            .model
            .forward(&input_ids)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        let probs = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?;

        ClassProbabilities::try_from(probs)
    }
}

impl Classifier for CnnClassifier {
    fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        Ok(self.probabilities(sequence)?.ai())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
