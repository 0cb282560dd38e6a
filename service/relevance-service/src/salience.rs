//! Section ranking against the persona query with an adaptive score cutoff.

use embedding_provider::{cosine_similarity, Embedder, EmbedderError, EmbedderHandle};
use outline_model::{RankedSection, Section};

#[derive(Debug, Clone)]
pub struct RankingParams {
    /// Only the best `top_n` sections are considered for output.
    pub top_n: usize,
    /// Kept regardless of threshold.
    pub min_keep: usize,
    /// 1-based rank whose score becomes the cutoff; fewer sections than this accept everything.
    pub threshold_rank: usize,
    pub threshold_clamp: (f32, f32),
    /// Characters of section content embedded after the title.
    pub content_prefix_chars: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            top_n: 15,
            min_keep: 5,
            threshold_rank: 8,
            threshold_clamp: (0.05, 0.25),
            content_prefix_chars: 800,
        }
    }
}

/// Persona and task joined into the ranking query.
pub fn persona_query(persona: &str, task: &str) -> String {
    format!("{} {}", persona.trim(), task.trim())
}

pub fn section_text(section: &Section, prefix_chars: usize) -> String {
    let prefix: String = section.content.chars().take(prefix_chars).collect();
    format!("{} {}", section.title, prefix).trim().to_string()
}

/// Cutoff from scores sorted descending.
pub fn adaptive_threshold(sorted_scores: &[f32], params: &RankingParams) -> f32 {
    if params.threshold_rank == 0 || sorted_scores.len() < params.threshold_rank {
        return 0.0;
    }
    let (lo, hi) = params.threshold_clamp;
    sorted_scores[params.threshold_rank - 1].min(hi).max(lo)
}

/// Query similarity of every text, in input order. NaN scores become 0.
pub(crate) fn similarities(
    embedder: &dyn Embedder,
    query: &str,
    texts: &[&str],
) -> Result<Vec<f32>, EmbedderError> {
    let vectors = embedder.embed_batch(texts)?;
    let query_vector = embedder.embed(query)?;
    Ok(vectors.iter().map(|v| score_or_zero(cosine_similarity(&query_vector, v))).collect())
}

fn score_or_zero(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score
    }
}

/// Indices ordered by descending score; equal scores keep input order and
/// NaN ranks as 0.
pub(crate) fn ranked_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| score_or_zero(scores[*b]).total_cmp(&score_or_zero(scores[*a])));
    order
}

/// Select the sections most relevant to `query`.
///
/// When the embedder cannot be loaded or fails, every section scores 0 and
/// the selection falls back to discovery order.
pub fn rank_sections(
    sections: &[Section],
    query: &str,
    embedder: &EmbedderHandle,
    params: &RankingParams,
) -> Vec<RankedSection> {
    if sections.is_empty() {
        return Vec::new();
    }

    let texts: Vec<String> =
        sections.iter().map(|s| section_text(s, params.content_prefix_chars)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let scores = match embedder.get().and_then(|e| similarities(e.as_ref(), query, &refs)) {
        Ok(scores) => scores,
        Err(err) => {
            tracing::warn!(
                error = %err,
                sections = sections.len(),
                "section embedding failed; using discovery order"
            );
            vec![0.0; sections.len()]
        }
    };

    select_sections(sections, &scores, params)
}

/// Apply the adaptive cutoff and minimum count to pre-computed scores.
pub fn select_sections(
    sections: &[Section],
    scores: &[f32],
    params: &RankingParams,
) -> Vec<RankedSection> {
    let scores: Vec<f32> = scores.iter().copied().map(score_or_zero).collect();
    let order = ranked_order(&scores);
    let sorted: Vec<f32> = order.iter().map(|i| scores[*i]).collect();
    let threshold = adaptive_threshold(&sorted, params);
    tracing::debug!(threshold, candidates = sections.len(), "section threshold");

    let mut kept: Vec<RankedSection> = Vec::new();
    for idx in order.into_iter().take(params.top_n) {
        let score = scores[idx];
        if score >= threshold || kept.len() < params.min_keep {
            kept.push(RankedSection {
                section: sections[idx].clone(),
                score,
                rank: kept.len() + 1,
            });
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_clamps_eighth_score() {
        let p = RankingParams::default();
        let high = [0.9, 0.8, 0.7, 0.6, 0.5, 0.45, 0.4, 0.35, 0.1];
        assert_eq!(adaptive_threshold(&high, &p), 0.25);
        let low = [0.3, 0.2, 0.1, 0.09, 0.08, 0.07, 0.06, 0.01];
        assert_eq!(adaptive_threshold(&low, &p), 0.05);
        let mid = [0.3, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.12];
        assert_eq!(adaptive_threshold(&mid, &p), 0.12);
        assert_eq!(adaptive_threshold(&[0.9; 7], &p), 0.0);
    }

    #[test]
    fn ties_keep_discovery_order() {
        assert_eq!(ranked_order(&[0.1, 0.5, 0.1, 0.5]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn nan_scores_rank_as_zero() {
        assert_eq!(ranked_order(&[0.2, f32::NAN, 0.5, 0.0]), vec![2, 0, 1, 3]);
        assert_eq!(ranked_order(&[f32::NAN, -0.3, f32::NAN]), vec![0, 2, 1]);

        let sections: Vec<Section> = (0..3)
            .map(|i| Section {
                title: format!("S{i}"),
                page: 1,
                content: String::new(),
                document: "a.pdf".into(),
            })
            .collect();
        let kept = select_sections(&sections, &[f32::NAN, 0.4, 0.1], &RankingParams::default());
        let titles: Vec<&str> = kept.iter().map(|r| r.section.title.as_str()).collect();
        assert_eq!(titles, vec!["S1", "S2", "S0"]);
        assert_eq!(kept[2].score, 0.0);
    }

    #[test]
    fn section_text_uses_title_and_content_prefix() {
        let s = Section {
            title: "Nice".into(),
            page: 1,
            content: "abcdef".into(),
            document: "a.pdf".into(),
        };
        assert_eq!(section_text(&s, 3), "Nice abc");
        let untitled = Section { title: String::new(), ..s };
        assert_eq!(section_text(&untitled, 10), "abcdef");
    }
}
