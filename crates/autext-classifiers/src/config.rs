//! Configuration for the detector and per-language model sources

use crate::cnn::CnnArchitecture;
use crate::model_loader::{DeviceType, ModelArtifact, ModelFormat, ModelSource};
use autext_core::{Error, Language, Result, MAX_SEQUENCE_LENGTH};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration for the whole detection pipeline
///
/// The encoded window is fixed at [`MAX_SEQUENCE_LENGTH`] tokens and is not
/// part of the file format; unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    /// Languages the identifier may choose from
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,

    /// Directory holding `word2idx_<code>.json` files
    #[serde(default = "default_vocab_dir")]
    pub vocab_dir: PathBuf,

    /// Where downloaded model artifacts are kept
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Network shape shared by every language's weights
    #[serde(default)]
    pub architecture: CnnArchitecture,

    /// Model source per language
    #[serde(default)]
    pub models: HashMap<Language, ModelSpec>,
}

/// Model entry in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Where to fetch the weights from
    #[serde(flatten)]
    pub source: ModelSourceSpec,

    /// Weight format; guessed from the file name when absent
    pub format: Option<ModelFormatSpec>,
}

/// Model source specification (for config files)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSourceSpec {
    /// Publicly shared Google Drive file
    GoogleDrive { drive_id: String },

    /// Hugging Face Hub
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },

    /// Plain HTTP(S) download
    Url { url: String },

    /// Local file path
    Local { path: PathBuf },
}

/// Device specification (for config files)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda {
        index: Option<usize>,
    },
    Metal {
        index: Option<usize>,
    },
}

/// Model format specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormatSpec {
    SafeTensors,
    PyTorch,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            vocab_dir: default_vocab_dir(),
            cache_dir: default_cache_dir(),
            device: DeviceSpec::default(),
            architecture: CnnArchitecture::default(),
            models: HashMap::new(),
        }
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Check the values hang together
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(Error::config("at least one language must be enabled"));
        }
        self.architecture.validate(MAX_SEQUENCE_LENGTH)
    }

    /// Resolved artifact for every configured language
    pub fn artifacts(&self) -> HashMap<Language, ModelArtifact> {
        self.models
            .iter()
            .map(|(language, spec)| (*language, spec.to_artifact()))
            .collect()
    }

    /// Whether a model source is configured for `language`
    pub fn has_model(&self, language: Language) -> bool {
        self.models.contains_key(&language)
    }
}

impl ModelSpec {
    /// Convert to the runtime artifact description
    pub fn to_artifact(&self) -> ModelArtifact {
        let source = match &self.source {
            ModelSourceSpec::GoogleDrive { drive_id } => ModelSource::GoogleDrive {
                file_id: drive_id.clone(),
            },
            ModelSourceSpec::HuggingFace {
                repo_id,
                filename,
                revision,
            } => ModelSource::HuggingFace {
                repo_id: repo_id.clone(),
                revision: revision.clone(),
                filename: filename.clone(),
            },
            ModelSourceSpec::Url { url } => ModelSource::Url(url.clone()),
            ModelSourceSpec::Local { path } => ModelSource::LocalPath(path.clone()),
        };

        let format = match self.format {
            Some(ModelFormatSpec::SafeTensors) => ModelFormat::SafeTensors,
            Some(ModelFormatSpec::PyTorch) => ModelFormat::PyTorch,
            None => self.guess_format(),
        };

        ModelArtifact { source, format }
    }

    fn guess_format(&self) -> ModelFormat {
        let name = match &self.source {
            ModelSourceSpec::HuggingFace { filename, .. } => Some(filename.as_str()),
            ModelSourceSpec::Url { url } => Some(url.as_str()),
            ModelSourceSpec::Local { path } => path.to_str(),
            // Drive shares carry no file name; the training notebooks export .pth
            ModelSourceSpec::GoogleDrive { .. } => return ModelFormat::PyTorch,
        };
        name.and_then(ModelFormat::from_name)
            .unwrap_or(ModelFormat::SafeTensors)
    }
}

impl DeviceSpec {
    /// Convert to DeviceType
    pub fn to_device_type(&self) -> DeviceType {
        match self {
            DeviceSpec::Cpu => DeviceType::Cpu,
            DeviceSpec::Cuda { index } => DeviceType::Cuda(index.unwrap_or(0)),
            DeviceSpec::Metal { index } => DeviceType::Metal(index.unwrap_or(0)),
        }
    }
}

fn default_languages() -> Vec<Language> {
    Language::ALL.to_vec()
}

fn default_vocab_dir() -> PathBuf {
    PathBuf::from("./word2idx")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("autext").join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
}
