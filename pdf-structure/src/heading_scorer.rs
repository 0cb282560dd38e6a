//! Heading probability scoring and the candidate pre-filter.
//!
//! The score is a plain sum of independent bonuses over [`HeadingFeatures`];
//! it is never normalised and only compared against other scores of the same
//! document.

use once_cell::sync::Lazy;
use regex::Regex;

use outline_model::TextSpan;

use crate::font_hierarchy::FontLevelMap;
use crate::lang_detect::LanguageDetector;
use crate::patterns::{contains_heading_keyword, matches_fallback_numbering, matches_numbering};

pub const FONT_WEIGHT_MAX: f64 = 40.0;
pub const FONT_WEIGHT_STEP: f64 = 8.0;
pub const BOLD_BONUS: f64 = 15.0;
pub const NUMBERING_BONUS: f64 = 20.0;
pub const KEYWORD_BONUS: f64 = 10.0;
pub const LENGTH_BONUS: f64 = 10.0;
pub const LONG_TEXT_PENALTY: f64 = 15.0;
pub const ALL_CAPS_BONUS: f64 = 5.0;
pub const SCRIPT_BONUS: f64 = 10.0;

/// Script of a text's leading character, by code-point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptClass {
    Cjk,
    Hiragana,
    Katakana,
    Hangul,
    Arabic,
    Devanagari,
    Cyrillic,
    Latin,
    Unknown,
}

impl ScriptClass {
    pub fn of_text(text: &str) -> Self {
        match text.chars().next() {
            Some(c) => Self::of_char(c),
            None => ScriptClass::Unknown,
        }
    }

    pub fn of_char(c: char) -> Self {
        match c as u32 {
            0x4E00..=0x9FFF => ScriptClass::Cjk,
            0x3040..=0x309F => ScriptClass::Hiragana,
            0x30A0..=0x30FF => ScriptClass::Katakana,
            0xAC00..=0xD7AF => ScriptClass::Hangul,
            0x0600..=0x06FF => ScriptClass::Arabic,
            0x0900..=0x097F => ScriptClass::Devanagari,
            0x0400..=0x04FF => ScriptClass::Cyrillic,
            0x0020..=0x024F => ScriptClass::Latin,
            _ => ScriptClass::Unknown,
        }
    }

    /// Scripts that earn the multilingual bonus.
    pub fn is_bonus_script(self) -> bool {
        !matches!(self, ScriptClass::Latin | ScriptClass::Unknown)
    }
}

/// Everything the score depends on, extracted from one span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingFeatures {
    pub font_level: u8,
    pub bold: bool,
    /// A numbering pattern (language, English or fallback prefix) matched.
    pub numbered: bool,
    pub keyword: bool,
    /// Length in characters.
    pub char_len: usize,
    /// Upper case with at least one alphabetic character.
    pub all_caps: bool,
    pub script: ScriptClass,
}

/// Composite heading score for one feature set.
pub fn heading_score(f: &HeadingFeatures) -> f64 {
    let mut score = (FONT_WEIGHT_MAX - (f.font_level as f64 - 1.0) * FONT_WEIGHT_STEP).max(0.0);
    if f.bold {
        score += BOLD_BONUS;
    }
    if f.numbered {
        score += NUMBERING_BONUS;
    }
    if f.keyword {
        score += KEYWORD_BONUS;
    }
    if (3..=100).contains(&f.char_len) {
        score += LENGTH_BONUS;
    } else if f.char_len > 150 {
        score -= LONG_TEXT_PENALTY;
    }
    if (5..=50).contains(&f.char_len) && f.all_caps {
        score += ALL_CAPS_BONUS;
    }
    if f.script.is_bonus_script() {
        score += SCRIPT_BONUS;
    }
    score
}

impl HeadingFeatures {
    /// Extract features for trimmed `text` detected as `lang`.
    pub fn extract(text: &str, font_size: f32, bold: bool, lang: &str, fonts: &FontLevelMap) -> Self {
        // Fallback prefixes only apply when no primary numbering pattern matched.
        let numbered = matches_numbering(text, lang) || matches_fallback_numbering(text);
        Self {
            font_level: fonts.level_of(font_size),
            bold,
            numbered,
            keyword: contains_heading_keyword(text, lang),
            char_len: text.chars().count(),
            all_caps: is_upper(text) && text.chars().any(char::is_alphabetic),
            script: ScriptClass::of_text(text),
        }
    }
}

/// A span that passed the filter, with its score and detected language.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSpan<'a> {
    pub span: &'a TextSpan,
    pub text: &'a str,
    pub score: f64,
    pub language: String,
}

/// Detect the language of a span and score it. Detection failure yields "unknown".
pub fn score_span<'a>(
    span: &'a TextSpan,
    fonts: &FontLevelMap,
    detector: &dyn LanguageDetector,
) -> ScoredSpan<'a> {
    let text = span.text.trim();
    let language = detector.detect_or_unknown(text);
    let features = HeadingFeatures::extract(text, span.font_size, span.bold, &language, fonts);
    let score = heading_score(&features);
    tracing::trace!(text, score, lang = %language, "scored span");
    ScoredSpan { span, text, score, language }
}

static NUMERIC_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\.\-_]+$").expect("static filter pattern compiles"));
static PUNCT_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\w\s]+$").expect("static filter pattern compiles"));

const LOWERCASE_EXEMPT: [&str; 4] = ["introduction", "abstract", "summary", "conclusion"];

/// Pre-filter run before scoring.
pub fn is_heading_candidate(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    if !(2..=200).contains(&len) {
        return false;
    }
    if NUMERIC_ONLY.is_match(text) || PUNCT_ONLY.is_match(text) {
        return false;
    }
    if ScriptClass::of_text(text) != ScriptClass::Latin {
        return true;
    }
    if is_lower(text) {
        let lower = text.to_lowercase();
        return LOWERCASE_EXEMPT.iter().any(|kw| lower.contains(kw));
    }
    true
}

/// At least one cased character and no lowercase ones.
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

/// At least one cased character and no uppercase ones.
pub fn is_lower(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}

/// Every word starts upper case and continues lower case ("Coastal Adventures").
pub fn is_title_case(text: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(level: u8, len: usize) -> HeadingFeatures {
        HeadingFeatures {
            font_level: level,
            bold: false,
            numbered: false,
            keyword: false,
            char_len: len,
            all_caps: false,
            script: ScriptClass::Latin,
        }
    }

    #[test]
    fn font_component_by_level() {
        let scores: Vec<f64> = (1..=5).map(|l| heading_score(&plain(l, 200))).collect();
        // 200 chars carries the long-text penalty
        assert_eq!(scores, vec![25.0, 17.0, 9.0, 1.0, -7.0]);
    }

    #[test]
    fn bonuses_are_additive() {
        let f = HeadingFeatures {
            bold: true,
            numbered: true,
            keyword: true,
            all_caps: true,
            ..plain(1, 12)
        };
        assert_eq!(heading_score(&f), 40.0 + 15.0 + 20.0 + 10.0 + 10.0 + 5.0);
        let g = HeadingFeatures { script: ScriptClass::Hangul, ..plain(5, 120) };
        assert_eq!(heading_score(&g), 8.0 + 10.0);
    }

    #[test]
    fn case_predicates_need_a_cased_char() {
        assert!(is_upper("TABLE OF CONTENTS 2"));
        assert!(!is_upper("123"));
        assert!(is_lower("some body text."));
        assert!(!is_lower("Some body"));
        assert!(is_title_case("Coastal Adventures"));
        assert!(is_title_case("3. Coastal Adventures"));
        assert!(!is_title_case("Coastal adventures"));
        assert!(!is_title_case("NICE"));
    }

    #[test]
    fn candidate_filter() {
        assert!(is_heading_candidate("1. Introduction"));
        assert!(!is_heading_candidate("1.2.3"));
        assert!(!is_heading_candidate("***"));
        assert!(!is_heading_candidate("x"));
        assert!(!is_heading_candidate("plain lowercase sentence"));
        assert!(is_heading_candidate("a short introduction"));
        assert!(is_heading_candidate("введение"));
        assert!(is_heading_candidate("ωμέγα"));
    }
}
