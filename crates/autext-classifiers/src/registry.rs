//! Per-language model cache
//!
//! Each language owns one [`OnceCell`] slot. The first request for a language
//! runs the injected [`ModelLoader`]; concurrent first requests wait on the
//! same load instead of starting their own. A failed load leaves the slot
//! empty so a later request can try again.

use crate::classifier::Classifier;
use crate::loader_plugin::ModelLoader;
use crate::vocabulary::Vocabulary;
use autext_core::{Language, Result};
use metrics::counter;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// A language's classifier paired with the vocabulary it was trained on
#[derive(Clone)]
pub struct LanguageModel {
    classifier: Arc<dyn Classifier>,
    vocabulary: Arc<Vocabulary>,
}

impl LanguageModel {
    pub fn new(classifier: Arc<dyn Classifier>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            classifier,
            vocabulary,
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl std::fmt::Debug for LanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageModel")
            .field("classifier", &self.classifier.name())
            .field("vocabulary_size", &self.vocabulary.len())
            .finish()
    }
}

/// Lazily populated cache of [`LanguageModel`]s, one slot per language
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    slots: [OnceCell<Arc<LanguageModel>>; Language::ALL.len()],
}

impl ModelRegistry {
    /// Create an empty registry backed by `loader`
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    /// Get the model for `language`, loading it on first use
    pub async fn get(&self, language: Language) -> Result<Arc<LanguageModel>> {
        let slot = &self.slots[language.index()];
        if let Some(model) = slot.get() {
            return Ok(Arc::clone(model));
        }

        let model = slot
            .get_or_try_init(|| async {
                info!(language = language.code(), "Loading model");
                let started = Instant::now();

                match self.loader.load(language).await {
                    Ok(model) => {
                        counter!("autext_model_loads_total", "language" => language.code(), "outcome" => "success")
                            .increment(1);
                        info!(
                            language = language.code(),
                            classifier = model.classifier().name(),
                            vocabulary = model.vocabulary().len(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Model loaded"
                        );
                        Ok(Arc::new(model))
                    }
                    Err(e) => {
                        counter!("autext_model_loads_total", "language" => language.code(), "outcome" => "failure")
                            .increment(1);
                        warn!(language = language.code(), error = %e, "Failed to load model");
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(model))
    }

    /// Install an already built model. Returns false if the slot was taken.
    pub fn insert(&self, language: Language, model: LanguageModel) -> bool {
        self.slots[language.index()].set(Arc::new(model)).is_ok()
    }

    /// Whether `language` is resident
    pub fn is_loaded(&self, language: Language) -> bool {
        self.slots[language.index()].initialized()
    }

    /// Resident languages
    pub fn loaded_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| self.is_loaded(*language))
            .collect()
    }

    /// Languages the loader can provide
    pub fn available_languages(&self) -> Vec<Language> {
        self.loader.available_languages()
    }

    /// Load every language in `languages`, failing on the first error
    pub async fn preload(&self, languages: &[Language]) -> Result<()> {
        futures::future::try_join_all(languages.iter().map(|language| self.get(*language)))
            .await
            .map(|_| ())
    }
}
