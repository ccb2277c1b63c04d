//! Model artifact resolution and Candle-based loading

use crate::cnn::{CnnArchitecture, CnnClassifier, TextCnn};
use crate::loader_plugin::ModelLoader;
use crate::registry::LanguageModel;
use crate::vocabulary::{vocabulary_path, Vocabulary};
use crate::DetectorConfig;
use autext_core::{Error, Language, Result};
use candle_core::pickle::PthTensors;
use candle_core::safetensors::MmapedSafetensors;
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use futures::StreamExt;
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const EMBEDDING_WEIGHT: &str = "embedding.weight";

/// Source location for a model artifact
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },

    /// Download from a plain HTTP(S) URL
    Url(String),

    /// Download a publicly shared Google Drive file
    GoogleDrive { file_id: String },
}

impl ModelSource {
    /// Direct download URL, for sources fetched over plain HTTP
    pub fn download_url(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.clone()),
            Self::GoogleDrive { file_id } => Some(format!(
                "https://drive.google.com/uc?id={}&export=download&confirm=t",
                file_id
            )),
            Self::LocalPath(_) | Self::HuggingFace { .. } => None,
        }
    }
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

/// Model file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// SafeTensors format (recommended)
    SafeTensors,
    /// PyTorch state dict
    PyTorch,
}

impl ModelFormat {
    /// File extension used for cached downloads
    pub fn extension(&self) -> &'static str {
        match self {
            Self::SafeTensors => "safetensors",
            Self::PyTorch => "pth",
        }
    }

    /// Guess the format from a file name or URL
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "safetensors" => Some(Self::SafeTensors),
            "pt" | "pth" | "bin" => Some(Self::PyTorch),
            _ => None,
        }
    }
}

/// Where a language's weights come from and how they are encoded
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub source: ModelSource,
    pub format: ModelFormat,
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::config(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::config(format!("Failed to create Metal device: {}", e))),
    }
}

/// Cache location for an HTTP-fetched artifact: `<cache_dir>/model_<code>.<ext>`
pub fn cached_artifact_path(cache_dir: &Path, language: Language, format: ModelFormat) -> PathBuf {
    cache_dir.join(format!("model_{}.{}", language.code(), format.extension()))
}

/// Make the artifact for `language` available on local disk and return its path.
///
/// Artifacts already in the cache are reused. HTTP downloads are written to a
/// `.part` file and renamed once complete.
pub async fn resolve_artifact(
    client: &reqwest::Client,
    language: Language,
    artifact: &ModelArtifact,
    cache_dir: &Path,
) -> Result<PathBuf> {
    match &artifact.source {
        ModelSource::LocalPath(path) => {
            if !path.exists() {
                return Err(Error::load(format!(
                    "Model file not found for {}: {}",
                    language,
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace {
            repo_id,
            revision,
            filename,
        } => {
            let repo = Repo::with_revision(
                repo_id.clone(),
                RepoType::Model,
                revision.clone().unwrap_or_else(|| "main".to_string()),
            );
            let filename = filename.clone();
            let hf_cache = cache_dir.join("huggingface");

            info!(language = language.code(), repo = repo_id.as_str(), "fetching model from Hugging Face");

            tokio::task::spawn_blocking(move || {
                let api = ApiBuilder::new()
                    .with_cache_dir(hf_cache)
                    .build()
                    .map_err(|e| Error::load(format!("Failed to initialize HF API: {}", e)))?;
                api.repo(repo)
                    .get(&filename)
                    .map_err(|e| Error::load(format!("Failed to download model from HF: {}", e)))
            })
            .await
            .map_err(|e| Error::load(format!("HF download task failed: {}", e)))?
        }
        ModelSource::Url(_) | ModelSource::GoogleDrive { .. } => {
            let target = cached_artifact_path(cache_dir, language, artifact.format);
            if target.exists() {
                debug!(language = language.code(), path = %target.display(), "reusing cached model");
                return Ok(target);
            }

            let url = artifact
                .source
                .download_url()
                .ok_or_else(|| Error::load("source has no download URL"))?;

            tokio::fs::create_dir_all(cache_dir).await.map_err(|e| {
                Error::load(format!(
                    "Failed to create cache directory {}: {}",
                    cache_dir.display(),
                    e
                ))
            })?;

            info!(language = language.code(), url = url.as_str(), "downloading model");
            download(client, &url, &target).await?;
            info!(language = language.code(), path = %target.display(), "model downloaded");

            Ok(target)
        }
    }
}

async fn download(client: &reqwest::Client, url: &str, target: &Path) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::load(format!("Failed to download {}: {}", url, e)))?;

    // Drive answers with an HTML interstitial when the file is not public
    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if is_html {
        return Err(Error::load(format!(
            "Download of {} returned an HTML page instead of model weights",
            url
        )));
    }

    let mut part_name = target.as_os_str().to_owned();
    part_name.push(".part");
    let part = PathBuf::from(part_name);

    let write_error =
        |e: std::io::Error| Error::load(format!("Failed to write {}: {}", part.display(), e));

    let result = async {
        let mut file = tokio::fs::File::create(&part).await.map_err(write_error)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::load(format!("Download interrupted: {}", e)))?;
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;
        drop(file);
        tokio::fs::rename(&part, target).await.map_err(|e| {
            Error::load(format!(
                "Failed to move {} into place: {}",
                part.display(),
                e
            ))
        })?;
        Ok::<(), Error>(())
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&part).await;
    }
    result
}

/// Map the weights file into a VarBuilder
pub fn load_var_builder(
    path: &Path,
    format: ModelFormat,
    device: &Device,
) -> Result<VarBuilder<'static>> {
    match format {
        ModelFormat::SafeTensors => {
            // SAFETY: cached artifacts are only ever replaced through rename,
            // never modified in place while mapped
            let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) };
            vb.map_err(|e| Error::load(format!("Failed to load SafeTensors: {}", e)))
        }
        ModelFormat::PyTorch => VarBuilder::from_pth(path, DType::F32, device)
            .map_err(|e| Error::load(format!("Failed to load PyTorch weights: {}", e))),
    }
}

/// Row count of the `embedding.weight` matrix stored in a weights file
pub fn stored_embedding_rows(path: &Path, format: ModelFormat) -> Result<usize> {
    let dims: Vec<usize> = match format {
        ModelFormat::SafeTensors => {
            // SAFETY: see load_var_builder
            let tensors = unsafe { MmapedSafetensors::new(path) };
            let tensors = tensors
                .map_err(|e| Error::load(format!("Failed to read SafeTensors header: {}", e)))?;
            let view = tensors.get(EMBEDDING_WEIGHT).map_err(|e| {
                Error::load(format!("{} missing from {}: {}", EMBEDDING_WEIGHT, path.display(), e))
            })?;
            view.shape().to_vec()
        }
        ModelFormat::PyTorch => {
            let tensors = PthTensors::new(path, None)
                .map_err(|e| Error::load(format!("Failed to read PyTorch weights: {}", e)))?;
            let info = tensors.tensor_infos().get(EMBEDDING_WEIGHT).ok_or_else(|| {
                Error::load(format!("{} missing from {}", EMBEDDING_WEIGHT, path.display()))
            })?;
            info.layout.shape().dims().to_vec()
        }
    };

    match dims.as_slice() {
        [rows, _] => Ok(*rows),
        other => Err(Error::load(format!(
            "{} has shape {:?}, expected a matrix",
            EMBEDDING_WEIGHT, other
        ))),
    }
}

/// Production [`ModelLoader`]: fetches weights, reads `word2idx_<code>.json`
/// and builds a [`CnnClassifier`].
pub struct CandleModelLoader {
    artifacts: HashMap<Language, ModelArtifact>,
    architecture: CnnArchitecture,
    vocab_dir: PathBuf,
    cache_dir: PathBuf,
    device: Device,
    client: reqwest::Client,
}

impl CandleModelLoader {
    pub fn new(
        artifacts: HashMap<Language, ModelArtifact>,
        architecture: CnnArchitecture,
        vocab_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        device: Device,
    ) -> Self {
        Self {
            artifacts,
            architecture,
            vocab_dir: vocab_dir.into(),
            cache_dir: cache_dir.into(),
            device,
            client: reqwest::Client::new(),
        }
    }

    /// Build from configuration
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let device = create_device(config.device.to_device_type())?;
        Ok(Self::new(
            config.artifacts(),
            config.architecture.clone(),
            &config.vocab_dir,
            &config.cache_dir,
            device,
        ))
    }

    /// Artifact configured for `language`
    pub fn artifact(&self, language: Language) -> Option<&ModelArtifact> {
        self.artifacts.get(&language)
    }

    async fn load_vocabulary(&self, language: Language) -> Result<Vocabulary> {
        let path = vocabulary_path(&self.vocab_dir, language);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::load(format!("failed to read vocabulary {}: {}", path.display(), e))
        })?;
        Vocabulary::from_json(&content)
    }
}

#[async_trait::async_trait]
impl ModelLoader for CandleModelLoader {
    async fn load(&self, language: Language) -> Result<LanguageModel> {
        let artifact = self.artifacts.get(&language).ok_or_else(|| {
            Error::load(format!("no model source configured for {}", language))
        })?;

        let vocabulary = self.load_vocabulary(language).await?;
        let weights = resolve_artifact(&self.client, language, artifact, &self.cache_dir).await?;

        let device = self.device.clone();
        let architecture = self.architecture.clone();
        let format = artifact.format;
        let needed_rows = vocabulary.embedding_rows();

        let model = tokio::task::spawn_blocking(move || {
            // Trained embeddings may carry rows past the highest vocabulary index
            let rows = stored_embedding_rows(&weights, format)?;
            if rows < needed_rows {
                return Err(Error::load(format!(
                    "Embedding in {} has {} rows but the vocabulary needs {}",
                    weights.display(),
                    rows,
                    needed_rows
                )));
            }
            let vb = load_var_builder(&weights, format, &device)?;
            let model = TextCnn::load(vb, rows, &architecture).map_err(|e| {
                Error::load(format!(
                    "Weights in {} do not match the classifier: {}",
                    weights.display(),
                    e
                ))
            })?;
            Ok::<_, Error>((model, device))
        })
        .await
        .map_err(|e| Error::load(format!("model load task failed: {}", e)))?;
        let (model, device) = model?;

        let classifier = CnnClassifier::new(format!("cnn-{}", language.code()), model, device);

        Ok(LanguageModel::new(Arc::new(classifier), Arc::new(vocabulary)))
    }

    fn available_languages(&self) -> Vec<Language> {
        let mut languages: Vec<_> = self.artifacts.keys().copied().collect();
        languages.sort();
        languages
    }
}
