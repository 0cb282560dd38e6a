//! Sentence-level refinement of a ranked section into short snippets.

use embedding_provider::EmbedderHandle;
use outline_model::Section;
use pdf_structure::{split_sentences, SentenceTokenizer};

use crate::salience::{ranked_order, similarities};

#[derive(Debug, Clone)]
pub struct RefineParams {
    pub top_n: usize,
    pub min_keep: usize,
    pub char_limit: usize,
    /// Sentences of this many characters or fewer are dropped.
    pub min_sentence_chars: usize,
    pub max_candidates: usize,
    /// Index into the descending scores used as cutoff, clamped to the last one.
    pub threshold_index: usize,
    pub threshold_clamp: (f32, f32),
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            top_n: 5,
            min_keep: 2,
            char_limit: 350,
            min_sentence_chars: 15,
            max_candidates: 40,
            threshold_index: 3,
            threshold_clamp: (0.02, 0.15),
        }
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

pub(crate) fn candidate_sentences(
    content: &str,
    tokenizer: &dyn SentenceTokenizer,
    params: &RefineParams,
) -> Vec<String> {
    split_sentences(tokenizer, content)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| s.chars().count() > params.min_sentence_chars)
        .take(params.max_candidates)
        .collect()
}

/// Sentences of `section` most relevant to `query`, each cut to `char_limit`.
///
/// If the embedder is unavailable the first `top_n` candidate sentences are
/// returned instead.
pub fn refine_subsections(
    section: &Section,
    query: &str,
    embedder: &EmbedderHandle,
    tokenizer: &dyn SentenceTokenizer,
    params: &RefineParams,
) -> Vec<String> {
    let sentences = candidate_sentences(&section.content, tokenizer, params);
    if sentences.is_empty() {
        return Vec::new();
    }

    let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
    let scores = match embedder.get().and_then(|e| similarities(e.as_ref(), query, &refs)) {
        Ok(scores) => scores,
        Err(err) => {
            tracing::debug!(
                error = %err,
                title = %section.title,
                "sentence embedding failed; using leading sentences"
            );
            return sentences
                .iter()
                .take(params.top_n)
                .map(|s| truncate_chars(s, params.char_limit))
                .collect();
        }
    };

    let order = ranked_order(&scores);
    let threshold = {
        let at = params.threshold_index.min(order.len() - 1);
        let (lo, hi) = params.threshold_clamp;
        scores[order[at]].min(hi).max(lo)
    };

    let mut kept = Vec::new();
    for idx in order.into_iter().take(params.top_n) {
        if scores[idx] >= threshold || kept.len() < params.min_keep {
            kept.push(truncate_chars(&sentences[idx], params.char_limit));
        }
    }
    kept
}
