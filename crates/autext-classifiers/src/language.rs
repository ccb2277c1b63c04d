//! Language identification restricted to the supported language set
//!
//! The built-in [`ProfileIdentifier`] scores each candidate language by
//! function-word hits, characteristic word endings and orthographic markers
//! (`ñ`, `ã`, `l·l`, `tx`, ...). Other identifiers can be plugged in through
//! the [`LanguageIdentifier`] trait; the pipeline validates whatever code they
//! return against the closed [`Language`] set.

use crate::encoder::WordTokenizer;
use autext_core::{Language, Result};
use std::collections::HashSet;

/// Result of identifying the language of a text
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Two-letter language code as reported by the identifier
    pub code: String,

    /// Share of the total evidence supporting `code` (0.0-1.0)
    pub confidence: f32,
}

/// Trait for language identifiers
pub trait LanguageIdentifier: Send + Sync {
    /// Identify the language of `text`
    fn identify(&self, text: &str) -> Result<Detection>;
}

struct LanguageProfile {
    language: Language,
    function_words: HashSet<&'static str>,
    suffixes: &'static [&'static str],
    markers: &'static [(&'static str, f32)],
}

const FUNCTION_WORD_WEIGHT: f32 = 1.0;
const SUFFIX_WEIGHT: f32 = 0.5;

impl LanguageProfile {
    fn for_language(language: Language) -> Self {
        let (words, suffixes, markers): (
            &'static [&'static str],
            &'static [&'static str],
            &'static [(&'static str, f32)],
        ) = match language {
            Language::En => (
                &[
                    "the", "and", "of", "to", "is", "in", "that", "it", "was", "for", "with",
                    "as", "are", "this", "be", "by", "have", "from", "which", "not", "were",
                    "they", "has", "been", "their", "an", "at", "or", "would", "there", "we",
                    "you", "but", "will", "can", "about", "these", "than", "into", "its",
                    "our", "also", "how", "what", "who", "n't", "'s",
                ],
                &["ing", "ly", "ness", "ed"],
                &[("w", 0.5), ("th", 0.5)],
            ),
            Language::Es => (
                &[
                    "el", "la", "los", "las", "de", "del", "y", "que", "en", "es", "por",
                    "con", "una", "para", "se", "su", "al", "lo", "como", "más", "pero",
                    "sus", "le", "ya", "muy", "también", "fue", "han", "sobre", "entre",
                    "cuando", "esta", "este", "desde", "hay", "son", "ha", "sin", "porque",
                    "está", "nos", "tiene", "puede", "todo", "hasta", "muchos", "donde",
                ],
                &["ción", "ciones", "dad", "mente"],
                &[("ñ", 1.0), ("¿", 1.5), ("¡", 1.5)],
            ),
            Language::Pt => (
                &[
                    "o", "os", "as", "de", "do", "da", "dos", "das", "e", "não", "uma", "um",
                    "em", "no", "na", "nos", "nas", "com", "para", "que", "é", "ao", "aos",
                    "mais", "foi", "pelo", "pela", "também", "muito", "muitos", "são", "seu",
                    "sua", "isso", "ele", "ela", "está", "mas", "se", "já", "ou", "quando",
                    "como", "entre", "sobre", "pode", "tem", "ser", "essa", "esse", "este",
                    "esta", "você", "até",
                ],
                &["ção", "ções", "mente"],
                &[("ã", 1.0), ("õ", 1.0), ("lh", 0.5), ("nh", 0.5), ("ç", 0.5)],
            ),
            Language::Gl => (
                &[
                    "o", "os", "as", "de", "do", "da", "dos", "das", "e", "non", "unha", "un",
                    "en", "no", "na", "nos", "nas", "con", "para", "que", "é", "ao", "aos",
                    "máis", "mais", "foi", "polo", "pola", "polos", "tamén", "moi", "moito",
                    "son", "seu", "súa", "isto", "iso", "ela", "está", "xa", "coa", "co",
                    "cando", "dende", "se", "ou", "como", "entre", "sobre", "pode", "ten",
                    "ser", "esa", "ese", "este", "esta", "aínda", "cómpre", "tódolos",
                ],
                &["cións", "ería"],
                &[("x", 0.5), ("ñ", 0.5)],
            ),
            Language::Eu => (
                &[
                    "eta", "da", "du", "ez", "bat", "ere", "dira", "zen", "dute", "baina",
                    "izan", "hau", "bere", "edo", "oso", "egin", "beste", "gero", "dago",
                    "zuen", "duen", "behar", "hori", "ziren", "baita", "bezala", "arte",
                    "gabe", "dela", "zuten", "baino", "ditu", "dituzte", "nahi", "guztiak",
                    "ondoren", "horrela", "nola", "euren",
                ],
                &["ak", "aren", "ean", "etan", "ko", "tik", "ekin"],
                &[("tz", 0.5), ("tx", 0.5)],
            ),
            Language::Ca => (
                &[
                    "el", "la", "els", "les", "de", "del", "dels", "i", "que", "en", "és",
                    "per", "amb", "una", "un", "es", "al", "als", "més", "però", "també",
                    "molt", "molts", "són", "aquest", "aquesta", "aquests", "seu", "seva",
                    "ha", "han", "va", "perquè", "quan", "hi", "ho", "això", "pel", "pels",
                    "sense", "fins", "entre", "sobre", "com", "cap", "tot", "tots",
                ],
                &["ció", "cions", "ment"],
                &[("l·l", 1.5), ("ç", 0.5)],
            ),
        };

        Self {
            language,
            function_words: words.iter().copied().collect(),
            suffixes,
            markers,
        }
    }

    fn score_token(&self, token: &str) -> f32 {
        let mut score = 0.0;

        if self.function_words.contains(token) {
            score += FUNCTION_WORD_WEIGHT;
        }

        let chars = token.chars().count();
        if self
            .suffixes
            .iter()
            .any(|suffix| chars > suffix.chars().count() + 1 && token.ends_with(suffix))
        {
            score += SUFFIX_WEIGHT;
        }

        for (marker, weight) in self.markers {
            if token.contains(marker) {
                score += weight;
            }
        }

        score
    }
}

/// Function-word/orthography profile identifier over a configured subset
pub struct ProfileIdentifier {
    tokenizer: WordTokenizer,
    profiles: Vec<LanguageProfile>,
}

impl ProfileIdentifier {
    /// Create an identifier choosing only among `languages`.
    ///
    /// The order of `languages` breaks ties and the first entry is the
    /// fallback for text without any evidence.
    pub fn new(languages: &[Language]) -> Result<Self> {
        if languages.is_empty() {
            return Err(autext_core::Error::config(
                "language identifier needs at least one candidate language",
            ));
        }

        let mut seen = HashSet::new();
        let profiles = languages
            .iter()
            .filter(|language| seen.insert(**language))
            .map(|language| LanguageProfile::for_language(*language))
            .collect();

        Ok(Self {
            tokenizer: WordTokenizer::new()?,
            profiles,
        })
    }

    /// Candidate languages in tie-break order
    pub fn languages(&self) -> Vec<Language> {
        self.profiles.iter().map(|p| p.language).collect()
    }

    /// Raw evidence per candidate language
    pub fn scores(&self, text: &str) -> Vec<(Language, f32)> {
        let tokens = self.tokenizer.tokenize(text);
        self.profiles
            .iter()
            .map(|profile| {
                let total = tokens.iter().map(|t| profile.score_token(t)).sum();
                (profile.language, total)
            })
            .collect()
    }
}

impl Default for ProfileIdentifier {
    fn default() -> Self {
        Self::new(&Language::ALL).expect("Failed to create language identifier")
    }
}

impl LanguageIdentifier for ProfileIdentifier {
    fn identify(&self, text: &str) -> Result<Detection> {
        let scores = self.scores(text);
        let total: f32 = scores.iter().map(|(_, s)| s).sum();

        // Strictly greater keeps the earliest candidate on ties
        let (language, best) = scores
            .iter()
            .skip(1)
            .fold(scores[0], |best, candidate| {
                if candidate.1 > best.1 {
                    *candidate
                } else {
                    best
                }
            });

        let confidence = if total > 0.0 { best / total } else { 0.0 };

        tracing::debug!(
            language = language.code(),
            confidence,
            "identified language"
        );

        Ok(Detection {
            code: language.code().to_string(),
            confidence,
        })
    }
}
