//! Per-language token → index tables produced at training time

use autext_core::{Error, Language, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reserved padding token
pub const PAD_TOKEN: &str = "<pad>";

/// Reserved unknown-token token
pub const UNK_TOKEN: &str = "<unk>";

/// Read-only vocabulary with resolved reserved indices
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word2idx: HashMap<String, u32>,
    pad_index: u32,
    unk_index: u32,
}

impl Vocabulary {
    /// Build from a token map; both reserved tokens must be present
    pub fn new(word2idx: HashMap<String, u32>) -> Result<Self> {
        let pad_index = *word2idx
            .get(PAD_TOKEN)
            .ok_or_else(|| Error::load(format!("vocabulary has no '{}' entry", PAD_TOKEN)))?;
        let unk_index = *word2idx
            .get(UNK_TOKEN)
            .ok_or_else(|| Error::load(format!("vocabulary has no '{}' entry", UNK_TOKEN)))?;

        Ok(Self {
            word2idx,
            pad_index,
            unk_index,
        })
    }

    /// Parse a `{"token": index, ...}` JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let word2idx: HashMap<String, u32> = serde_json::from_str(json)
            .map_err(|e| Error::load(format!("invalid vocabulary JSON: {}", e)))?;
        Self::new(word2idx)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::load(format!("failed to read vocabulary {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Index of `token`, or the unknown index
    pub fn index_of(&self, token: &str) -> u32 {
        self.word2idx.get(token).copied().unwrap_or(self.unk_index)
    }

    pub fn pad_index(&self) -> u32 {
        self.pad_index
    }

    pub fn unk_index(&self) -> u32 {
        self.unk_index
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.word2idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word2idx.is_empty()
    }

    /// Rows the embedding matrix needs to cover every index
    pub fn embedding_rows(&self) -> usize {
        self.word2idx
            .values()
            .max()
            .map(|max| *max as usize + 1)
            .unwrap_or(0)
    }
}

/// Conventional vocabulary location: `<dir>/word2idx_<code>.json`
pub fn vocabulary_path(vocab_dir: &Path, language: Language) -> PathBuf {
    vocab_dir.join(format!("word2idx_{}.json", language.code()))
}
