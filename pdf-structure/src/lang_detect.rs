//! Language detection for heading candidates.
//!
//! The default detector is deterministic: the dominant Unicode script decides
//! the language for non-Latin text, and Latin text is matched against small
//! stop-word and diacritic profiles.

use outline_model::UNKNOWN_LANGUAGE;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LangDetectError {
    #[error("no alphabetic features in text")]
    NoFeatures,
    #[error("detector failure: {0}")]
    Detector(String),
}

/// Maps a text snippet to an ISO-639-1-like language code.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<String, LangDetectError>;

    /// Detection with failures mapped to `"unknown"`.
    fn detect_or_unknown(&self, text: &str) -> String {
        self.detect(text).unwrap_or_else(|_| UNKNOWN_LANGUAGE.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Cyrillic,
    Arabic,
    Devanagari,
    Han,
    Kana,
    Hangul,
    Other,
}

fn script_of(c: char) -> Script {
    match c as u32 {
        0x0041..=0x024F => Script::Latin,
        0x0400..=0x04FF => Script::Cyrillic,
        0x0600..=0x06FF => Script::Arabic,
        0x0900..=0x097F => Script::Devanagari,
        0x3040..=0x30FF => Script::Kana,
        0x4E00..=0x9FFF => Script::Han,
        0xAC00..=0xD7AF | 0x1100..=0x11FF => Script::Hangul,
        _ => Script::Other,
    }
}

/// (language, stop words, distinctive characters)
const LATIN_PROFILES: &[(&str, &[&str], &str)] = &[
    ("en", &["the", "and", "of", "to", "in", "for", "with", "is", "on", "this"], ""),
    ("es", &["el", "la", "los", "las", "de", "y", "en", "del", "para", "con"], "ñ¿¡"),
    ("fr", &["le", "la", "les", "des", "et", "du", "pour", "une", "dans", "avec"], "çèêëœ"),
    ("de", &["der", "die", "das", "und", "mit", "für", "ein", "eine", "von", "zu"], "äöüß"),
    ("it", &["il", "lo", "gli", "della", "e", "di", "per", "con", "una", "che"], "ìò"),
    ("pt", &["o", "os", "as", "do", "da", "dos", "e", "para", "com", "uma"], "ãõ"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptLanguageDetector;

impl ScriptLanguageDetector {
    pub fn new() -> Self {
        Self
    }

    fn latin_language(text: &str) -> &'static str {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .collect();

        let mut best: (&'static str, usize) = ("en", 0);
        for (lang, stop_words, marks) in LATIN_PROFILES {
            let hits = words.iter().filter(|w| stop_words.contains(*w)).count()
                + lower.chars().filter(|c| marks.contains(*c)).count() * 2;
            // strictly greater keeps the earlier profile on ties
            if hits > best.1 {
                best = (*lang, hits);
            }
        }
        best.0
    }
}

impl LanguageDetector for ScriptLanguageDetector {
    fn detect(&self, text: &str) -> Result<String, LangDetectError> {
        let mut counts = [0usize; 8];
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            counts[script_of(c) as usize] += 1;
        }
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Err(LangDetectError::NoFeatures);
        }

        let kana = counts[Script::Kana as usize];
        let han = counts[Script::Han as usize];
        let candidates = [
            (Script::Latin, counts[Script::Latin as usize]),
            (Script::Cyrillic, counts[Script::Cyrillic as usize]),
            (Script::Arabic, counts[Script::Arabic as usize]),
            (Script::Devanagari, counts[Script::Devanagari as usize]),
            (Script::Hangul, counts[Script::Hangul as usize]),
            // Japanese text mixes kanji with kana; kana alone marks it.
            (Script::Kana, if kana > 0 { kana + han } else { 0 }),
            (Script::Han, han),
        ];
        let (script, n) = candidates
            .iter()
            .copied()
            .fold((Script::Other, 0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        if n == 0 {
            return Err(LangDetectError::NoFeatures);
        }

        let lang = match script {
            Script::Latin => Self::latin_language(text),
            Script::Cyrillic => "ru",
            Script::Arabic => "ar",
            Script::Devanagari => "hi",
            Script::Hangul => "ko",
            Script::Kana => "ja",
            Script::Han => "zh",
            Script::Other => return Err(LangDetectError::NoFeatures),
        };
        Ok(lang.to_string())
    }
}
