//! Fixed multilingual lookup tables used by heading scoring and title selection.
//!
//! Each table maps a language code to an ordered list; callers always consult
//! the detected language first and then English.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Language whose tables are always consulted after the detected one.
pub const FALLBACK_LANGUAGE: &str = "en";

const NUMBERING_SOURCES: &[(&str, &[&str])] = &[
    ("en", &[r"^\d+(\.\d+)*[\.\-]?\s*", r"^Chapter\s+\d+", r"^Section\s+\d+"]),
    ("es", &[r"^Cap[íi]tulo\s+\d+", r"^Secci[óo]n\s+\d+"]),
    ("fr", &[r"^Chapitre\s+\d+", r"^Section\s+\d+"]),
    ("de", &[r"^Kapitel\s+\d+", r"^Abschnitt\s+\d+"]),
    ("it", &[r"^Capitolo\s+\d+", r"^Sezione\s+\d+"]),
    ("pt", &[r"^Cap[ií]tulo\s+\d+", r"^Se[çc][ãa]o\s+\d+"]),
    ("ru", &[r"^Глава\s+\d+", r"^Раздел\s+\d+"]),
    ("ar", &[r"^[\x{0621}-\x{064A}]+\s+\d+", r"^الفصل\s+\d+"]),
    ("zh", &[r"^第[一二三四五六七八九十\d]+章", r"^[一二三四五六七八九十\d]+\."]),
    ("ja", &[r"^第[一二三四五六七八九十\d]+章", r"^[一二三四五六七八九十\d]+\."]),
    ("ko", &[r"^[가-힣]+\s+\d+장", r"^제\d+장"]),
    ("hi", &[r"^[\x{0900}-\x{097F}]+\s+\d+", r"^अध्याय\s+\d+"]),
];

const KEYWORD_SOURCES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "introduction", "summary", "table of contents", "references", "acknowledgements",
            "abstract", "conclusion", "overview", "background", "methodology", "results",
            "discussion", "revision history", "appendix", "bibliography", "contents", "preface",
        ],
    ),
    (
        "es",
        &[
            "introducción", "resumen", "índice", "referencias", "agradecimientos",
            "resumen ejecutivo", "conclusión", "metodología", "resultados",
        ],
    ),
    (
        "fr",
        &[
            "introduction", "résumé", "sommaire", "références", "remerciements", "conclusion",
            "méthodologie", "résultats", "discussion",
        ],
    ),
    (
        "de",
        &[
            "einführung", "zusammenfassung", "inhalt", "literaturverzeichnis", "dank", "fazit",
            "methodik", "ergebnisse", "diskussion",
        ],
    ),
    (
        "it",
        &[
            "introduzione", "sommario", "indice", "riferimenti", "ringraziamenti", "conclusione",
            "metodologia", "risultati", "discussione",
        ],
    ),
    (
        "pt",
        &[
            "introdução", "resumo", "índice", "referências", "agradecimentos", "conclusão",
            "metodologia", "resultados", "discussão",
        ],
    ),
    (
        "ru",
        &[
            "введение", "резюме", "содержание", "литература", "благодарности", "заключение",
            "методология", "результаты",
        ],
    ),
    ("ar", &["مقدمة", "ملخص", "الفهرس", "المراجع", "شكر", "خلاصة", "النتائج", "المناقشة"]),
    ("zh", &["目录", "摘要", "结论", "参考文献", "致谢", "引言", "概述", "背景", "方法", "结果"]),
    ("ja", &["目次", "概要", "結論", "参考文献", "謝辞", "はじめに", "緒言", "背景", "方法", "結果"]),
    ("ko", &["목차", "요약", "결론", "참고문헌", "감사", "서론", "배경", "방법", "결과"]),
    ("hi", &["परिचय", "सारांश", "अनुक्रमणिका", "निष्कर्ष", "संदर्भ", "पृष्ठभूमि", "विधि"]),
];

fn compile_ci(src: &str) -> Regex {
    Regex::new(&format!("(?i){src}")).expect("static heading pattern compiles")
}

static NUMBERING: Lazy<HashMap<&'static str, Vec<Regex>>> = Lazy::new(|| {
    NUMBERING_SOURCES
        .iter()
        .map(|(lang, pats)| (*lang, pats.iter().map(|p| compile_ci(p)).collect()))
        .collect()
});

static KEYWORDS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| KEYWORD_SOURCES.iter().map(|(lang, kws)| (*lang, *kws)).collect());

/// Plain numeric, alphabetic and roman-numeral prefixes, tried only when no
/// numbering pattern matched.
static FALLBACK_NUMBERING: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(\d+\.?\s+)",
        r"^(\d+\.\d+\.?\s+)",
        r"^(\d+\.\d+\.\d+\.?\s+)",
        r"^([A-Z]\.?\s+)",
        r"^([IVX]+\.?\s+)",
    ]
    .iter()
    .map(|p| compile_ci(p))
    .collect()
});

/// Document-type patterns, searched against lowercased heading text.
static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r".*overview.*foundation.*level.*extension.*",
        r".*foundation.*level.*extension.*",
        r".*syllabus.*",
        r".*curriculum.*",
        r".*guide.*",
        r".*概要.*",
        r".*指南.*",
        r".*교과.*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static title pattern compiles"))
    .collect()
});

static DOTTED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(\.\d+)*)(\s+|\.|-)").expect("static prefix pattern compiles"));

fn with_fallback<'a, T>(
    table: &'a HashMap<&'static str, T>,
    lang: &str,
) -> impl Iterator<Item = &'a T> + 'a {
    let primary = if lang == FALLBACK_LANGUAGE { None } else { table.get(lang) };
    primary.into_iter().chain(table.get(FALLBACK_LANGUAGE))
}

/// True when `text` starts with a numbering/chapter/section marker of `lang` or English.
pub fn matches_numbering(text: &str, lang: &str) -> bool {
    with_fallback(&*NUMBERING, lang).flatten().any(|re| re.is_match(text))
}

pub fn matches_fallback_numbering(text: &str) -> bool {
    FALLBACK_NUMBERING.iter().any(|re| re.is_match(text))
}

/// True when the lowercased text contains a heading keyword of `lang` or English.
pub fn contains_heading_keyword(text: &str, lang: &str) -> bool {
    let lower = text.to_lowercase();
    with_fallback(&*KEYWORDS, lang)
        .flat_map(|kws| kws.iter())
        .any(|kw| lower.contains(kw))
}

pub fn matches_title_pattern(text: &str) -> bool {
    let lower = text.to_lowercase();
    TITLE_PATTERNS.iter().any(|re| re.is_match(&lower))
}

/// Depth of a dotted numeric prefix: "2.1.3 Scope" -> 3, "4. Results" -> 1.
pub fn numbering_prefix_depth(text: &str) -> Option<usize> {
    DOTTED_PREFIX
        .captures(text.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().matches('.').count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_uses_language_then_english() {
        assert!(matches_numbering("Kapitel 3 Methoden", "de"));
        assert!(matches_numbering("Chapter 2", "de"));
        assert!(matches_numbering("第三章 方法", "zh"));
        assert!(!matches_numbering("第三章 方法", "en"));
        assert!(matches_numbering("section 4", "unknown"));
        assert!(!matches_numbering("Overview", "en"));
    }

    #[test]
    fn prefix_depth_counts_dots() {
        assert_eq!(numbering_prefix_depth("2.1.3 Scope"), Some(3));
        assert_eq!(numbering_prefix_depth("4. Results"), Some(1));
        assert_eq!(numbering_prefix_depth("1-Intro"), Some(1));
        assert_eq!(numbering_prefix_depth("  3.2 Data"), Some(2));
        assert_eq!(numbering_prefix_depth("Appendix A"), None);
        assert_eq!(numbering_prefix_depth("2024"), None);
    }

    #[test]
    fn keywords_and_titles() {
        assert!(contains_heading_keyword("Revision History", "en"));
        assert!(contains_heading_keyword("Einführung in das Thema", "de"));
        assert!(!contains_heading_keyword("Pricing", "fr"));
        assert!(matches_title_pattern("Overview Foundation Level Extensions"));
        assert!(matches_title_pattern("Travel GUIDE"));
        assert!(!matches_title_pattern("Introduction"));
    }

    #[test]
    fn fallback_prefixes() {
        assert!(matches_fallback_numbering("B. Appendix"));
        assert!(matches_fallback_numbering("iv Results"));
        assert!(!matches_fallback_numbering("Results"));
    }
}
