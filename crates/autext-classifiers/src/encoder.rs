//! Word tokenization and fixed-width index encoding

use crate::vocabulary::Vocabulary;
use autext_core::{Result, MAX_SEQUENCE_LENGTH};
use regex::{Captures, Regex};

/// Rewrite rules applied to each sentence, in order, before splitting on
/// whitespace. These are the Penn Treebank conventions the vocabularies were
/// built with.
const STARTING_QUOTES: &[(&str, &str)] = &[
    (r"([«“‘„]|`+)", " ${1} "),
    (r#"^""#, "``"),
    (r"(``)", " ${1} "),
    (r#"([ (\[{<])("|'')"#, "${1} `` "),
];

const PUNCTUATION: &[(&str, &str)] = &[
    // Only the sentence-final period is split off
    (r#"([^.])(\.)([\])}>"']*)\s*$"#, "${1} ${2}${3} "),
    // Commas and colons inside numbers stay
    (r"([:,])([^\d])", " ${1} ${2}"),
    (r"([:,])$", " ${1} "),
    (r"\.{2,}", " ${0} "),
    (r"[;@#$%&]", " ${0} "),
    (r"[?!]", " ${0} "),
    (r"([^'])' ", "${1} ' "),
    (r"[*]", " ${0} "),
    (r"[\]\[(){}<>]", " ${0} "),
    (r"--", " -- "),
];

const ENDING_QUOTES: &[(&str, &str)] = &[
    (r"([»”’])", " ${1} "),
    (r"''", " '' "),
    (r#"""#, " '' "),
    (r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
    (r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
];

const CONTRACTIONS: &[(&str, &str)] = &[
    (r"(?i)\b(can)(not)\b", " ${1} ${2} "),
    (r"(?i)\b(d)('ye)\b", " ${1} ${2} "),
    (r"(?i)\b(gim)(me)\b", " ${1} ${2} "),
    (r"(?i)\b(gon)(na)\b", " ${1} ${2} "),
    (r"(?i)\b(got)(ta)\b", " ${1} ${2} "),
    (r"(?i)\b(lem)(me)\b", " ${1} ${2} "),
    (r"(?i)\b(more)('n)\b", " ${1} ${2} "),
    (r"(?i)\b(wan)(na)(\s)", " ${1} ${2}${3}"),
    (r"(?i) ('t)(is)\b", " ${1} ${2} "),
    (r"(?i) ('t)(was)\b", " ${1} ${2} "),
];

/// A quote before a one-letter word opens a quotation, unless the letter
/// is a clitic (`'s`, `'t`, ...)
const QUOTED_LETTER: &str = r"'(\w)\b";
const CLITIC_LETTERS: &[char] = &['m', 't', 's', 'd', 'n'];

/// Sentence terminators followed by whitespace
const SENTENCE_END: &str = r#"[.!?]+["'”’)\]]*\s+"#;

/// Words whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "dra", "prof", "sr", "sra", "srta", "jr", "vs", "núm", "pág", "pp",
    "vol", "fig", "approx", "inc", "ltd", "corp", "avda",
];

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn apply(&self, text: String) -> String {
        if self.pattern.is_match(&text) {
            self.pattern.replace_all(&text, self.replacement).into_owned()
        } else {
            text
        }
    }
}

fn compile(rules: &[(&str, &'static str)]) -> Result<Vec<Rule>> {
    rules
        .iter()
        .map(|(pattern, replacement)| {
            Ok(Rule {
                pattern: compile_pattern(pattern)?,
                replacement: *replacement,
            })
        })
        .collect()
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        autext_core::Error::classifier(format!("Failed to compile token regex {}: {}", pattern, e))
    })
}

/// Treebank-style word tokenizer over lower-cased text.
///
/// The text is split into sentences first; each sentence is then rewritten
/// so that every token is surrounded by spaces. Clitics are split off
/// (`don't` -> `do n't`, `john's` -> `john 's`), numbers keep their
/// separators (`3.5`, `1,000`), double quotes become ``` `` ``` and `''`, and
/// a period is only split off at the end of a sentence.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    starting_quotes: Vec<Rule>,
    quoted_letter: Regex,
    punctuation: Vec<Rule>,
    ending_quotes: Vec<Rule>,
    contractions: Vec<Rule>,
    sentence_end: Regex,
}

impl WordTokenizer {
    /// Create a new tokenizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            starting_quotes: compile(STARTING_QUOTES)?,
            quoted_letter: compile_pattern(QUOTED_LETTER)?,
            punctuation: compile(PUNCTUATION)?,
            ending_quotes: compile(ENDING_QUOTES)?,
            contractions: compile(CONTRACTIONS)?,
            sentence_end: compile_pattern(SENTENCE_END)?,
        })
    }

    /// Lower-case `text` and split it into tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.sentences(&lowered)
            .into_iter()
            .flat_map(|sentence| self.tokenize_sentence(sentence))
            .collect()
    }

    /// Split on sentence terminators, skipping periods after abbreviations,
    /// initials and ellipses
    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.sentence_end.find_iter(text) {
            let terminator = m.as_str();
            if terminator.starts_with('.') {
                let word = text[start..m.start()]
                    .rsplit(char::is_whitespace)
                    .next()
                    .unwrap_or("");
                if terminator.starts_with("..") || is_abbreviation(word) {
                    continue;
                }
            }
            sentences.push(text[start..m.end()].trim());
            start = m.end();
        }
        sentences.push(text[start..].trim());

        sentences.retain(|s| !s.is_empty());
        sentences
    }

    fn tokenize_sentence(&self, sentence: &str) -> Vec<String> {
        let mut text = sentence.to_string();

        for rule in &self.starting_quotes {
            text = rule.apply(text);
        }
        text = self
            .quoted_letter
            .replace_all(&text, |caps: &Captures| {
                let letter = &caps[1];
                if letter.chars().all(|c| CLITIC_LETTERS.contains(&c)) {
                    caps[0].to_string()
                } else {
                    format!("' {}", letter)
                }
            })
            .into_owned();

        for rule in &self.punctuation {
            text = rule.apply(text);
        }

        let mut text = format!(" {} ", text);
        for rule in self.ending_quotes.iter().chain(&self.contractions) {
            text = rule.apply(text);
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}

fn is_abbreviation(word: &str) -> bool {
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    // Initials ("j.") and dotted abbreviations ("e.g.", "u.s.")
    let single_letter = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
    let dotted = word.contains('.')
        && word
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(char::is_alphabetic));
    single_letter || dotted || ABBREVIATIONS.contains(&word)
}

/// Fixed-width sequence of vocabulary indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    ids: Vec<u32>,
    /// Tokens that came from the text (the rest is padding)
    token_count: usize,
    /// Tokens dropped because the text was longer than the window
    truncated: usize,
}

impl EncodedSequence {
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn truncated(&self) -> usize {
        self.truncated
    }
}

/// Turns paragraphs into classifier input
#[derive(Debug, Clone)]
pub struct Encoder {
    tokenizer: WordTokenizer,
    max_length: usize,
}

impl Encoder {
    /// Create an encoder producing sequences of exactly `max_length` indices
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(autext_core::Error::config("max_length must be positive"));
        }
        Ok(Self {
            tokenizer: WordTokenizer::new()?,
            max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Encode `text`: tokens past `max_length` are dropped, unknown tokens
    /// map to `<unk>`, and the tail is filled with `<pad>`.
    pub fn encode(&self, text: &str, vocabulary: &Vocabulary) -> EncodedSequence {
        let tokens = self.tokenizer.tokenize(text);
        let token_count = tokens.len().min(self.max_length);
        let truncated = tokens.len() - token_count;

        let mut ids: Vec<u32> = tokens
            .iter()
            .take(self.max_length)
            .map(|token| vocabulary.index_of(token))
            .collect();
        ids.resize(self.max_length, vocabulary.pad_index());

        EncodedSequence {
            ids,
            token_count,
            truncated,
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(MAX_SEQUENCE_LENGTH).expect("Failed to create encoder")
    }
}
