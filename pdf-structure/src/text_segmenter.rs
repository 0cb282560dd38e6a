//! Sentence splitting behind a pluggable tokenizer trait.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("sentence tokenizer failed: {0}")]
    Tokenizer(String),
}

/// Splits a text blob into sentences in reading order.
pub trait SentenceTokenizer: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>, SegmentError>;
}

/// UAX #29 sentence boundaries; sentences are trimmed and empties dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceTokenizer;

impl SentenceTokenizer for UnicodeSentenceTokenizer {
    fn split(&self, text: &str) -> Result<Vec<String>, SegmentError> {
        Ok(text
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("static sentence pattern compiles"));

/// Punctuation-based split used when the tokenizer fails. Every piece gets a
/// trailing period.
pub fn regex_sentence_split(text: &str) -> Vec<String> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}."))
        .collect()
}

/// Tokenize with `tokenizer`, falling back to [`regex_sentence_split`].
pub fn split_sentences(tokenizer: &dyn SentenceTokenizer, text: &str) -> Vec<String> {
    match tokenizer.split(text) {
        Ok(sentences) => sentences,
        Err(err) => {
            tracing::warn!(error = %err, "sentence tokenizer failed; using punctuation split");
            regex_sentence_split(text)
        }
    }
}
