//! Extension point for per-language model loading.

use crate::registry::LanguageModel;
use autext_core::{Language, Result};

/// Pluggable backend that produces the classifier and vocabulary for a language.
///
/// The registry calls this at most once per language for the lifetime of the
/// process (again only after a failed attempt). [`crate::CandleModelLoader`] is
/// the production backend; tests inject in-memory loaders.
#[async_trait::async_trait]
pub trait ModelLoader: Send + Sync {
    /// Fetch, deserialize and pair the model and vocabulary for `language`.
    async fn load(&self, language: Language) -> Result<LanguageModel>;

    /// Languages this loader has a source for.
    fn available_languages(&self) -> Vec<Language>;
}
