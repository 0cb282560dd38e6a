pub mod font_hierarchy;
pub mod heading_levels;
pub mod heading_scorer;
pub mod lang_detect;
pub mod outline;
pub mod patterns;
pub mod reader_pdf;
#[cfg(feature = "pure-pdf")]
pub mod reader_pdf_pure;
pub mod section_segmenter;
pub mod stats;
pub mod text_segmenter;
pub mod unified_blocks;

use std::path::Path;

use outline_model::{DocumentLayout, Outline, Section, TextSpan};

pub use font_hierarchy::{analyze_font_hierarchy, FontLevelMap};
pub use heading_levels::{assign_heading_levels, HeadingParams};
pub use lang_detect::{LangDetectError, LanguageDetector, ScriptLanguageDetector};
pub use outline::{assemble_outline, build_outline, select_title};
pub use reader_pdf::{default_backend, read_pdf_layout, read_pdf_layout_with, PdfBackend, ReadError};
pub use section_segmenter::{segment_sections, SegmentParams};
pub use text_segmenter::{
    regex_sentence_split, split_sentences, SegmentError, SentenceTokenizer, UnicodeSentenceTokenizer,
};
pub use unified_blocks::BlockParams;

/// Heading outline of one document from its span sequence.
pub fn extract_outline<'a, I>(spans: I, detector: &dyn LanguageDetector, params: &HeadingParams) -> Outline
where
    I: IntoIterator<Item = &'a TextSpan>,
{
    let spans: Vec<&TextSpan> = spans.into_iter().collect();
    if spans.is_empty() {
        return Outline::untitled();
    }
    let fonts = analyze_font_hierarchy(spans.iter().copied());
    let headings = assign_heading_levels(spans.iter().copied(), &fonts, detector, params);
    assemble_outline(&headings)
}

pub fn outline_from_layout(
    layout: &DocumentLayout,
    detector: &dyn LanguageDetector,
    params: &HeadingParams,
) -> Outline {
    extract_outline(layout.spans(), detector, params)
}

/// Read a PDF and build its outline.
pub fn process_pdf(
    path: &Path,
    backend: PdfBackend,
    detector: &dyn LanguageDetector,
    params: &HeadingParams,
) -> Result<Outline, ReadError> {
    let layout = read_pdf_layout(path, backend)?;
    let outline = outline_from_layout(&layout, detector, params);
    tracing::info!(
        file = %path.display(),
        pages = layout.page_count,
        entries = outline.outline.len(),
        "outline extracted"
    );
    Ok(outline)
}

/// Read a PDF and split it into titled sections attributed to `document`.
pub fn extract_sections(
    path: &Path,
    backend: PdfBackend,
    document: &str,
    params: &SegmentParams,
) -> Result<Vec<Section>, ReadError> {
    let layout = read_pdf_layout(path, backend)?;
    Ok(segment_sections(&layout.blocks, document, params))
}
