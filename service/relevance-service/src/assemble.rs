//! Report assembly, including the backfill of sparse section and snippet lists.

use chrono::{DateTime, Utc};
use outline_model::{
    ExtractedSection, RankedSection, RelevanceReport, ReportMetadata, Section, SubsectionSnippet,
};

use crate::subsection::truncate_chars;

/// Minimum-output guarantees applied after ranking.
#[derive(Debug, Clone)]
pub struct BackfillParams {
    pub min_sections: usize,
    pub max_sections: usize,
    /// Leading sections of the pool considered for section backfill.
    pub section_scan: usize,
    pub min_snippets: usize,
    pub max_snippets: usize,
    pub snippet_scan: usize,
    pub snippet_chars: usize,
}

impl Default for BackfillParams {
    fn default() -> Self {
        Self {
            min_sections: 3,
            max_sections: 10,
            section_scan: 10,
            min_snippets: 5,
            max_snippets: 20,
            snippet_scan: 5,
            snippet_chars: 350,
        }
    }
}

pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn extracted_sections(ranked: &[RankedSection]) -> Vec<ExtractedSection> {
    ranked.iter().map(|r| ExtractedSection::from_section(&r.section, r.rank)).collect()
}

/// Raw content prefix of a section, or `None` when it is blank.
pub fn content_snippet(section: &Section, chars: usize) -> Option<SubsectionSnippet> {
    let text = truncate_chars(&section.content, chars).trim().to_string();
    (!text.is_empty()).then(|| SubsectionSnippet {
        document: section.document.clone(),
        page: section.page,
        refined_text: text,
    })
}

/// Top up a short section list from the head of the pool, skipping sections
/// already present.
pub fn backfill_sections(extracted: &mut Vec<ExtractedSection>, pool: &[Section], params: &BackfillParams) {
    if extracted.len() >= params.min_sections || pool.len() < params.min_sections {
        return;
    }
    for section in pool.iter().take(params.section_scan) {
        if extracted.len() >= params.max_sections {
            break;
        }
        if extracted.iter().any(|e| e.key() == section.key()) {
            continue;
        }
        let rank = extracted.len() + 1;
        extracted.push(ExtractedSection::from_section(section, rank));
    }
}

/// Top up a short snippet list with raw content from the head of the pool.
/// Duplicates of existing snippets are allowed.
pub fn backfill_snippets(snippets: &mut Vec<SubsectionSnippet>, pool: &[Section], params: &BackfillParams) {
    if snippets.len() >= params.min_snippets || pool.is_empty() {
        return;
    }
    for section in pool.iter().take(params.snippet_scan) {
        if snippets.len() >= params.max_snippets {
            break;
        }
        snippets.extend(content_snippet(section, params.snippet_chars));
    }
}

pub struct ReportInput<'a> {
    pub input_documents: Vec<String>,
    pub persona: &'a str,
    pub task: &'a str,
    pub pool: &'a [Section],
    pub ranked: &'a [RankedSection],
    pub snippets: Vec<SubsectionSnippet>,
}

pub fn build_report(input: ReportInput<'_>, params: &BackfillParams, now: DateTime<Utc>) -> RelevanceReport {
    let mut sections = extracted_sections(input.ranked);
    let mut snippets = input.snippets;
    backfill_sections(&mut sections, input.pool, params);
    backfill_snippets(&mut snippets, input.pool, params);

    RelevanceReport {
        metadata: ReportMetadata {
            input_documents: input.input_documents,
            persona: input.persona.to_string(),
            job_to_be_done: input.task.to_string(),
            timestamp: utc_timestamp(now),
        },
        extracted_sections: sections,
        sub_section_analysis: snippets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_has_seconds_precision() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 12, 34, 56).unwrap();
        assert_eq!(utc_timestamp(now), "2025-07-10T12:34:56Z");
    }
}
