//! Assignment of H1-H3 levels to scored heading candidates.

use outline_model::{Heading, TextSpan};

use crate::font_hierarchy::FontLevelMap;
use crate::heading_scorer::{is_heading_candidate, score_span, ScoredSpan};
use crate::lang_detect::LanguageDetector;
use crate::patterns::numbering_prefix_depth;
use crate::stats::percentile;

/// Deepest level an outline entry can carry.
pub const MAX_HEADING_LEVEL: u8 = 4;

/// Thresholds for accepting scored candidates as headings.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingParams {
    /// Acceptance threshold never drops below this score.
    pub threshold_floor: f64,
    /// Percentile of candidate scores used as the adaptive threshold.
    pub threshold_percentile: f64,
    /// (minimum score, level cap), checked in order; scores below every
    /// entry are capped at [`MAX_HEADING_LEVEL`].
    pub score_caps: Vec<(f64, u8)>,
}

impl Default for HeadingParams {
    fn default() -> Self {
        Self {
            threshold_floor: 30.0,
            threshold_percentile: 70.0,
            score_caps: vec![(60.0, 1), (50.0, 2), (40.0, 3)],
        }
    }
}

impl HeadingParams {
    pub fn threshold(&self, scores: &[f64]) -> f64 {
        match percentile(scores, self.threshold_percentile) {
            Some(p) => p.max(self.threshold_floor),
            None => self.threshold_floor,
        }
    }

    pub fn score_cap(&self, score: f64) -> u8 {
        self.score_caps
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, cap)| *cap)
            .unwrap_or(MAX_HEADING_LEVEL)
    }
}

/// The more prominent of two levels. Level 1 is the most prominent, so this is
/// the numerically smaller one: a strong score can promote a heading above its
/// font level, and a large font keeps its level even with a weak score.
pub fn more_prominent(font_level: u8, score_cap: u8) -> u8 {
    if score_cap < font_level {
        score_cap
    } else {
        font_level
    }
}

/// Level for an accepted heading. A dotted numeric prefix is authoritative.
pub fn heading_level(text: &str, score: f64, font_level: u8, params: &HeadingParams) -> u8 {
    if let Some(depth) = numbering_prefix_depth(text) {
        return depth.min(MAX_HEADING_LEVEL as usize) as u8;
    }
    more_prominent(font_level, params.score_cap(score))
}

/// Filter, score and threshold all spans of a document.
///
/// Headings come back in descending score order; equal scores keep document order.
pub fn assign_heading_levels<'a, I>(
    spans: I,
    fonts: &FontLevelMap,
    detector: &dyn LanguageDetector,
    params: &HeadingParams,
) -> Vec<Heading>
where
    I: IntoIterator<Item = &'a TextSpan>,
{
    let mut scored: Vec<ScoredSpan<'a>> = spans
        .into_iter()
        .filter(|s| is_heading_candidate(&s.text))
        .map(|s| score_span(s, fonts, detector))
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let scores: Vec<f64> = scored.iter().map(|s| s.score).collect();
    let threshold = params.threshold(&scores);
    tracing::debug!(candidates = scored.len(), threshold, "heading threshold");

    scored
        .into_iter()
        .filter(|s| s.score >= threshold)
        .map(|s| {
            let font_level = fonts.level_of(s.span.font_size);
            Heading {
                text: s.text.to_string(),
                level: heading_level(s.text, s.score, font_level, params),
                page: s.span.page,
                score: s.score,
                language: s.language,
                y: s.span.y,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_caps_and_prominence() {
        let p = HeadingParams::default();
        assert_eq!(p.score_cap(75.0), 1);
        assert_eq!(p.score_cap(50.0), 2);
        assert_eq!(p.score_cap(41.0), 3);
        assert_eq!(p.score_cap(30.0), 4);
        assert_eq!(more_prominent(5, 1), 1);
        assert_eq!(more_prominent(2, 4), 2);
    }

    #[test]
    fn dotted_prefix_wins() {
        let p = HeadingParams::default();
        assert_eq!(heading_level("2.1.3 Scope", 90.0, 1, &p), 3);
        assert_eq!(heading_level("1.2.3.4.5 Deep", 30.0, 1, &p), 4);
        assert_eq!(heading_level("Overview", 45.0, 5, &p), 3);
    }

    #[test]
    fn threshold_floor() {
        let p = HeadingParams::default();
        assert_eq!(p.threshold(&[]), 30.0);
        assert_eq!(p.threshold(&[10.0, 20.0]), 30.0);
        assert!((p.threshold(&[40.0, 50.0, 60.0, 70.0]) - 61.0).abs() < 1e-9);
    }
}
