//! Splits a document's blocks into titled sections for relevance ranking.
//!
//! Each block is flattened into one line. Lines that look like headers open a
//! new section; every other line is appended to the open section's content.
//! Text before the first header is discarded.

use once_cell::sync::Lazy;
use regex::Regex;

use outline_model::{Section, TextBlock};

use crate::heading_scorer::{is_title_case, is_upper};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentParams {
    /// Lines shorter than this (in chars) are skipped entirely.
    pub min_line_len: usize,
    /// Header candidates must be shorter than this.
    pub max_header_len: usize,
    pub bold_max_len: usize,
    pub large_font_size: f32,
    pub large_font_max_len: usize,
    /// Exclusive bounds for all-caps headers.
    pub caps_len: (usize, usize),
    pub title_case_max_len: usize,
    /// A closed section is kept only if its content is longer than this.
    pub min_content_len: usize,
    /// Average size assumed for a block without measurable runs.
    pub default_font_size: f32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            min_line_len: 3,
            max_header_len: 150,
            bold_max_len: 100,
            large_font_size: 12.0,
            large_font_max_len: 80,
            caps_len: (5, 60),
            title_case_max_len: 80,
            min_content_len: 20,
            default_font_size: 10.0,
        }
    }
}

static HEADER_PREFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^(\d+(\.\d+)*[\.\-]?\s+)", r"^([A-Z][\.\)]?\s+)", r"^([IVX]+[\.\)]?\s+)"]
        .iter()
        .map(|p| Regex::new(p).expect("static header pattern compiles"))
        .collect()
});

/// Matched against the lowercased line.
static STRUCTURAL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(abstract|introduction|summary|conclusion|references|bibliography|appendix|methodology|results|discussion|background|literature|analysis|evaluation|assessment|findings|recommendations|executive summary|table of contents|acknowledgements|preface)",
    )
    .expect("static keyword pattern compiles")
});

static NUMBERED_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(chapter|section|part|volume|book|unit)\s+\d+").expect("static part pattern compiles")
});

/// One block flattened to a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    pub text: String,
    pub avg_font_size: f32,
    pub bold: bool,
    pub page: u32,
}

impl BlockLine {
    pub fn from_block(block: &TextBlock, default_font_size: f32) -> Self {
        let mut parts = Vec::with_capacity(block.spans.len());
        let mut size_sum = 0.0f32;
        let mut bold = false;
        for span in &block.spans {
            let t = span.text.trim();
            if t.is_empty() {
                continue;
            }
            parts.push(t);
            size_sum += span.font_size;
            bold |= span.bold;
        }
        let avg_font_size = if parts.is_empty() {
            default_font_size
        } else {
            size_sum / parts.len() as f32
        };
        Self { text: parts.join(" "), avg_font_size, bold, page: block.page }
    }
}

pub fn is_section_header(line: &BlockLine, params: &SegmentParams) -> bool {
    let text = line.text.as_str();
    let len = text.chars().count();
    if len >= params.max_header_len {
        return false;
    }
    if HEADER_PREFIXES.iter().any(|re| re.is_match(text)) {
        return true;
    }
    if line.bold && len < params.bold_max_len {
        return true;
    }
    if line.avg_font_size > params.large_font_size && len < params.large_font_max_len {
        return true;
    }
    let (caps_min, caps_max) = params.caps_len;
    if is_upper(text) && caps_min < len && len < caps_max {
        return true;
    }
    if is_title_case(text) && len < params.title_case_max_len && text.contains(' ') {
        return true;
    }
    let lower = text.to_lowercase();
    STRUCTURAL_KEYWORD.is_match(&lower) || NUMBERED_PART.is_match(&lower)
}

/// Segment one document's blocks (in reading order) into sections.
pub fn segment_sections(blocks: &[TextBlock], document: &str, params: &SegmentParams) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    let close = |section: Option<Section>, sections: &mut Vec<Section>| {
        if let Some(mut s) = section {
            s.content = s.content.trim().to_string();
            if s.content.chars().count() > params.min_content_len {
                sections.push(s);
            }
        }
    };

    for block in blocks {
        let line = BlockLine::from_block(block, params.default_font_size);
        if line.text.chars().count() < params.min_line_len {
            continue;
        }
        if is_section_header(&line, params) {
            close(current.take(), &mut sections);
            current = Some(Section {
                title: line.text,
                page: line.page,
                content: String::new(),
                document: document.to_string(),
            });
        } else if let Some(section) = current.as_mut() {
            section.content.push(' ');
            section.content.push_str(&line.text);
        }
    }
    close(current.take(), &mut sections);

    tracing::debug!(document, sections = sections.len(), "segmented sections");
    sections
}
