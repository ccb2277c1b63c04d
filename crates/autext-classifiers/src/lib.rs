//! autext Classifiers
//!
//! Per-language detection of AI-generated paragraphs.
//!
//! The pipeline identifies the language of a text, fetches that language's
//! CNN classifier and vocabulary on first use, splits the text on blank
//! lines and scores every paragraph:
//! - [`language`]: language identification over the supported set
//! - [`encoder`]: tokenization into fixed-width index sequences
//! - [`cnn`]: the convolutional classifier (Candle)
//! - [`registry`]: the per-language model cache
//! - [`pipeline`]: the [`Detector`] tying it all together

pub mod classifier;
pub mod cnn;
pub mod config;
pub mod encoder;
pub mod language;
pub mod loader_plugin;
pub mod model_loader;
pub mod pipeline;
pub mod registry;
pub mod vocabulary;

pub use classifier::{ClassProbabilities, Classifier};
pub use cnn::{CnnArchitecture, CnnClassifier, TextCnn};
pub use config::{DetectorConfig, DeviceSpec, ModelFormatSpec, ModelSourceSpec, ModelSpec};
pub use encoder::{EncodedSequence, Encoder, WordTokenizer};
pub use language::{Detection, LanguageIdentifier, ProfileIdentifier};
pub use loader_plugin::ModelLoader;
pub use model_loader::{
    cached_artifact_path, create_device, load_var_builder, resolve_artifact, stored_embedding_rows,
    CandleModelLoader, DeviceType, ModelArtifact, ModelFormat, ModelSource,
};
pub use pipeline::Detector;
pub use registry::{LanguageModel, ModelRegistry};
pub use vocabulary::{vocabulary_path, Vocabulary, PAD_TOKEN, UNK_TOKEN};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::config::DetectorConfig;
    pub use crate::language::LanguageIdentifier;
    pub use crate::loader_plugin::ModelLoader;
    pub use crate::pipeline::Detector;
    pub use crate::registry::{LanguageModel, ModelRegistry};
    pub use crate::vocabulary::Vocabulary;
}
