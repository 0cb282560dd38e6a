use std::sync::Arc;

use embedding_provider::{Embedder, EmbedderError, EmbedderHandle, EmbedderInfo, ProviderKind};
use outline_model::{ExtractedSection, Section, SubsectionSnippet};
use pdf_structure::{SegmentError, SentenceTokenizer, UnicodeSentenceTokenizer};
use relevance_service::assemble::{backfill_sections, backfill_snippets};
use relevance_service::{
    build_report, rank_sections, refine_subsections, BackfillParams, RankingParams, RefineParams,
    ReportInput,
};

/// Texts that start with a number `s` embed at cosine `s` from the query;
/// anything else embeds as the query itself.
struct FixedScoreEmbedder {
    info: EmbedderInfo,
}

impl FixedScoreEmbedder {
    fn handle() -> EmbedderHandle {
        EmbedderHandle::ready(Arc::new(Self {
            info: EmbedderInfo { provider: ProviderKind::Hashed, embedding_model_id: "fixed".into(), dimension: 2 },
        }))
    }
}

impl Embedder for FixedScoreEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let score = text.split_whitespace().next().and_then(|t| t.parse::<f32>().ok());
        Ok(match score {
            Some(s) => vec![s, (1.0 - s * s).max(0.0).sqrt()],
            None => vec![1.0, 0.0],
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

fn failing_handle() -> EmbedderHandle {
    EmbedderHandle::lazy(|| Err(EmbedderError::ProviderFailure { message: "model missing".into() }))
}

fn section(score: f32, i: usize) -> Section {
    Section {
        title: format!("{score:.2}"),
        page: i as u32 + 1,
        content: format!("content of section {i} with enough text"),
        document: "doc.pdf".into(),
    }
}

fn pool(scores: &[f32]) -> Vec<Section> {
    scores.iter().enumerate().map(|(i, s)| section(*s, i)).collect()
}

fn pages(ranked: &[outline_model::RankedSection]) -> Vec<u32> {
    ranked.iter().map(|r| r.section.page).collect()
}

#[test]
fn small_pools_accept_everything_in_score_order() {
    let sections = pool(&[0.1, 0.6, 0.3, 0.02, 0.45, 0.2]);
    let ranked = rank_sections(&sections, "persona task", &FixedScoreEmbedder::handle(), &RankingParams::default());
    assert_eq!(pages(&ranked), vec![2, 5, 3, 6, 1, 4]);
    assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    assert!((ranked[0].score - 0.6).abs() < 1e-4);
}

#[test]
fn eighth_score_is_clamped_to_upper_bound() {
    let mut scores = vec![0.9, 0.85, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];
    scores.extend([0.05; 10]);
    let ranked = rank_sections(&pool(&scores), "q", &FixedScoreEmbedder::handle(), &RankingParams::default());
    // cutoff min(0.3, 0.25) keeps every score at or above 0.25
    assert_eq!(ranked.len(), 8);
}

#[test]
fn hard_minimum_of_five_ignores_threshold() {
    let ranked = rank_sections(&pool(&[0.01; 10]), "q", &FixedScoreEmbedder::handle(), &RankingParams::default());
    assert_eq!(ranked.len(), 5);
    assert_eq!(pages(&ranked), vec![1, 2, 3, 4, 5]);
}

#[test]
fn only_top_fifteen_are_considered() {
    let ranked = rank_sections(&pool(&[0.9; 30]), "q", &FixedScoreEmbedder::handle(), &RankingParams::default());
    assert_eq!(ranked.len(), 15);
    assert_eq!(ranked.last().map(|r| r.rank), Some(15));
}

#[test]
fn embedding_failure_falls_back_to_discovery_order() {
    let ranked = rank_sections(&pool(&[0.9; 10]), "q", &failing_handle(), &RankingParams::default());
    assert_eq!(pages(&ranked), vec![1, 2, 3, 4, 5]);
    assert!(ranked.iter().all(|r| r.score == 0.0));

    let ranked = rank_sections(&pool(&[0.9; 3]), "q", &failing_handle(), &RankingParams::default());
    assert_eq!(ranked.len(), 3);
}

#[test]
fn empty_pool_ranks_nothing() {
    assert!(rank_sections(&[], "q", &FixedScoreEmbedder::handle(), &RankingParams::default()).is_empty());
}

fn sentences_section(scores: &[f32]) -> Section {
    let content = scores
        .iter()
        .map(|s| format!("{s:.2} the harbour walk passes old markets."))
        .collect::<Vec<_>>()
        .join(" ");
    Section { title: "Walks".into(), page: 4, content, document: "guide.pdf".into() }
}

fn leading_scores(snippets: &[String]) -> Vec<String> {
    snippets.iter().map(|s| s.split_whitespace().next().unwrap_or("").to_string()).collect()
}

#[test]
fn sentence_threshold_is_fourth_score_clamped() {
    let s = sentences_section(&[0.5, 0.1, 0.4, 0.01, 0.3, 0.2]);
    let got = refine_subsections(&s, "q", &FixedScoreEmbedder::handle(), &UnicodeSentenceTokenizer, &RefineParams::default());
    assert_eq!(leading_scores(&got), vec!["0.50", "0.40", "0.30", "0.20"]);
}

#[test]
fn two_sentences_are_always_kept() {
    let s = sentences_section(&[0.01, 0.01, 0.01, 0.01, 0.01]);
    let got = refine_subsections(&s, "q", &FixedScoreEmbedder::handle(), &UnicodeSentenceTokenizer, &RefineParams::default());
    assert_eq!(got.len(), 2);
}

#[test]
fn few_sentences_use_the_last_score_as_cutoff() {
    let s = sentences_section(&[0.1, 0.9]);
    let got = refine_subsections(&s, "q", &FixedScoreEmbedder::handle(), &UnicodeSentenceTokenizer, &RefineParams::default());
    assert_eq!(leading_scores(&got), vec!["0.90", "0.10"]);
}

#[test]
fn refined_sentences_are_truncated() {
    let long = format!("0.80 {}.", "x".repeat(500));
    let s = Section { title: "Long".into(), page: 1, content: long, document: "d.pdf".into() };
    let got = refine_subsections(&s, "q", &FixedScoreEmbedder::handle(), &UnicodeSentenceTokenizer, &RefineParams::default());
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].chars().count(), 350);
}

#[test]
fn embedding_failure_returns_leading_sentences() {
    let s = sentences_section(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
    let got = refine_subsections(&s, "q", &failing_handle(), &UnicodeSentenceTokenizer, &RefineParams::default());
    assert_eq!(leading_scores(&got), vec!["0.10", "0.20", "0.30", "0.40", "0.50"]);
}

struct FailingTokenizer;

impl SentenceTokenizer for FailingTokenizer {
    fn split(&self, _text: &str) -> Result<Vec<String>, SegmentError> {
        Err(SegmentError::Tokenizer("punkt data missing".into()))
    }
}

#[test]
fn tokenizer_failure_uses_punctuation_split() {
    let s = Section {
        title: "Tips".into(),
        page: 2,
        content: "0.70 book the ferry a day early! 0.20 ok. 0.60 carry cash for the markets".into(),
        document: "tips.pdf".into(),
    };
    let got = refine_subsections(&s, "q", &FixedScoreEmbedder::handle(), &FailingTokenizer, &RefineParams::default());
    assert_eq!(got, vec!["0.70 book the ferry a day early.", "0.60 carry cash for the markets."]);
}

fn extracted(doc: &str, page: u32, title: &str, rank: usize) -> ExtractedSection {
    ExtractedSection { document: doc.into(), page, section_title: title.into(), importance_rank: rank }
}

#[test]
fn section_backfill_skips_duplicates_and_continues_ranks() {
    let sections = pool(&[0.1, 0.2, 0.3, 0.4]);
    let mut out = vec![extracted("doc.pdf", 2, "0.20", 1)];
    backfill_sections(&mut out, &sections, &BackfillParams::default());
    let got: Vec<(u32, usize)> = out.iter().map(|e| (e.page, e.importance_rank)).collect();
    assert_eq!(got, vec![(2, 1), (1, 2), (3, 3), (4, 4)]);
}

#[test]
fn section_backfill_needs_three_pooled_sections_and_stops_at_ten() {
    let mut out = Vec::new();
    backfill_sections(&mut out, &pool(&[0.1, 0.2]), &BackfillParams::default());
    assert!(out.is_empty());

    let mut out = Vec::new();
    backfill_sections(&mut out, &pool(&[0.1; 25]), &BackfillParams::default());
    assert_eq!(out.len(), 10);

    let mut full = vec![extracted("a.pdf", 1, "A", 1), extracted("a.pdf", 2, "B", 2), extracted("a.pdf", 3, "C", 3)];
    backfill_sections(&mut full, &pool(&[0.1; 5]), &BackfillParams::default());
    assert_eq!(full.len(), 3);
}

#[test]
fn snippet_backfill_uses_first_five_sections() {
    let mut sections = pool(&[0.1; 8]);
    sections[1].content = "   ".into();
    let mut snippets = vec![SubsectionSnippet { document: "doc.pdf".into(), page: 1, refined_text: "kept".into() }];
    backfill_snippets(&mut snippets, &sections, &BackfillParams::default());
    let got: Vec<u32> = snippets.iter().map(|s| s.page).collect();
    assert_eq!(got, vec![1, 1, 3, 4, 5]);
    assert_eq!(snippets[1].refined_text, "content of section 0 with enough text");

    let mut none = Vec::new();
    backfill_snippets(&mut none, &[], &BackfillParams::default());
    assert!(none.is_empty());
}

fn short_sentence_pool(n: usize) -> Vec<Section> {
    (0..n)
        .map(|i| Section {
            title: "0.50".into(),
            page: i as u32 + 1,
            content: "A. B. C.".into(),
            document: "doc.pdf".into(),
        })
        .collect()
}

#[test]
fn short_sentences_leave_refinement_empty_and_report_backfills() {
    let embedder = FixedScoreEmbedder::handle();
    let pool = short_sentence_pool(12);
    let refined = refine_subsections(
        &pool[0],
        "q",
        &embedder,
        &UnicodeSentenceTokenizer,
        &RefineParams::default(),
    );
    assert!(refined.is_empty());

    let ranked = rank_sections(&pool, "q", &embedder, &RankingParams::default());
    let snippets: Vec<SubsectionSnippet> = ranked
        .iter()
        .flat_map(|r| {
            let params = RefineParams::default();
            refine_subsections(&r.section, "q", &embedder, &UnicodeSentenceTokenizer, &params)
        })
        .map(|text| SubsectionSnippet { document: "doc.pdf".into(), page: 1, refined_text: text })
        .collect();
    assert!(snippets.is_empty());

    let now = chrono::Utc::now();
    let report = build_report(
        ReportInput {
            input_documents: vec!["doc.pdf".into()],
            persona: "Traveller",
            task: "Plan a trip",
            pool: &pool,
            ranked: &ranked,
            snippets,
        },
        &BackfillParams::default(),
        now,
    );
    assert_eq!(report.extracted_sections.len(), ranked.len());
    let pages: Vec<u32> = report.sub_section_analysis.iter().map(|s| s.page).collect();
    assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    assert!(report.sub_section_analysis.iter().all(|s| s.refined_text == "A. B. C."));
}

#[test]
fn snippet_backfill_stops_at_the_cap() {
    let params = BackfillParams { min_snippets: 30, snippet_scan: 50, ..BackfillParams::default() };
    let mut snippets = Vec::new();
    backfill_snippets(&mut snippets, &short_sentence_pool(25), &params);
    assert_eq!(snippets.len(), params.max_snippets);
    assert_eq!(snippets.last().map(|s| s.page), Some(20));
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use relevance_service::salience::select_sections;

    proptest! {
        #[test]
        fn kept_count_respects_minimum_and_cap(scores in prop::collection::vec(-1.0f32..1.0, 0..40)) {
            let sections = pool(&scores);
            let ranked = select_sections(&sections, &scores, &RankingParams::default());
            prop_assert!(ranked.len() >= scores.len().min(5));
            prop_assert!(ranked.len() <= scores.len().min(15));
            for (i, r) in ranked.iter().enumerate() {
                prop_assert_eq!(r.rank, i + 1);
                if i > 0 {
                    prop_assert!(ranked[i - 1].score >= r.score);
                }
            }
        }
    }
}
