//! Shared models used across crates

use serde::{Deserialize, Serialize};

/// Language code used when detection fails or is not attempted.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Title emitted when a document yields no accepted headings.
pub const UNTITLED: &str = "Untitled";

/// A contiguous run of text sharing one font size/style, with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    /// 1-based page number.
    pub page: u32,
    pub x: f32,
    /// Distance from the top of the page; larger values are further down.
    pub y: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        Self { text: text.into(), font_size, bold: false, italic: false, page, x: 0.0, y: 0.0 }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// A group of runs that the span provider considers one text block on a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub page: u32,
    pub spans: Vec<TextSpan>,
}

impl TextBlock {
    pub fn new(page: u32, spans: Vec<TextSpan>) -> Self {
        Self { page, spans }
    }
}

/// Text content of one document, block by block in reading order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub page_count: u32,
    pub blocks: Vec<TextBlock>,
}

impl DocumentLayout {
    /// All runs of the document in block order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.blocks.iter().flat_map(|b| b.spans.iter())
    }

    pub fn span_count(&self) -> usize {
        self.blocks.iter().map(|b| b.spans.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.span_count() == 0
    }
}

/// An accepted heading. `level` is always within 1..=4.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub page: u32,
    pub score: f64,
    pub language: String,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// "H1".."H4"
    pub level: String,
    pub text: String,
    pub page: u32,
    pub language: String,
}

/// Pipeline A result persisted as `{"title": .., "outline": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    pub fn untitled() -> Self {
        Self { title: UNTITLED.to_string(), outline: Vec::new() }
    }
}

/// A titled run of body text discovered by the section segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub page: u32,
    pub content: String,
    /// File name of the source document.
    pub document: String,
}

impl Section {
    /// Identity used when backfilling: (document, page, title).
    pub fn key(&self) -> (&str, u32, &str) {
        (&self.document, self.page, &self.title)
    }
}

/// A section kept by the salience ranker. `rank` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection {
    pub section: Section,
    pub score: f32,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub page: u32,
    pub section_title: String,
    pub importance_rank: usize,
}

impl ExtractedSection {
    pub fn from_section(section: &Section, importance_rank: usize) -> Self {
        Self {
            document: section.document.clone(),
            page: section.page,
            section_title: section.title.clone(),
            importance_rank,
        }
    }

    pub fn key(&self) -> (&str, u32, &str) {
        (&self.document, self.page, &self.section_title)
    }
}

/// A refined sentence (or raw content prefix) attributed to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionSnippet {
    pub document: String,
    pub page: u32,
    pub refined_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// UTC, seconds precision, e.g. `2025-07-10T12:34:56Z`.
    pub timestamp: String,
}

/// Pipeline B result persisted as one JSON document per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceReport {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub sub_section_analysis: Vec<SubsectionSnippet>,
}

// ------------------------------
// Collection input config
// ------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Input config of a collection (`challenge1b_input.json`). Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInput {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    pub documents: Vec<DocumentRef>,
}

impl CollectionInput {
    pub fn filenames(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.filename.as_str()).collect()
    }
}
