//! Grouping of positioned text runs into lines and blocks.
//!
//! Every reader backend produces flat runs per page; this module turns them
//! into the [`TextBlock`] sequence both pipelines consume.

use outline_model::{TextBlock, TextSpan};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockParams {
    /// Runs whose baselines differ by less than this (pt) share a line.
    pub line_tolerance: f32,
    /// A vertical gap larger than this multiple of the previous line's font
    /// size starts a new block.
    pub block_gap_factor: f32,
}

impl Default for BlockParams {
    fn default() -> Self {
        Self { line_tolerance: 3.0, block_gap_factor: 1.5 }
    }
}

/// Runs sharing a baseline, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub page: u32,
    pub y: f32,
    pub font_size: f32,
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    fn start(span: TextSpan) -> Self {
        Self { page: span.page, y: span.y, font_size: span.font_size, spans: vec![span] }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
    }
}

/// Sort runs top to bottom, left to right, and merge runs on the same baseline.
pub fn group_into_lines(mut spans: Vec<TextSpan>, tolerance: f32) -> Vec<TextLine> {
    spans.sort_by(|a, b| a.page.cmp(&b.page).then(a.y.total_cmp(&b.y)).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some(line) if line.page == span.page && (line.y - span.y).abs() < tolerance => {
                line.font_size = line.font_size.max(span.font_size);
                line.spans.push(span);
            }
            _ => lines.push(TextLine::start(span)),
        }
    }
    for line in &mut lines {
        line.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Merge consecutive lines into blocks, splitting on page changes and on
/// vertical gaps.
pub fn group_into_blocks(lines: Vec<TextLine>, params: &BlockParams) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut prev: Option<(u32, f32, f32)> = None;
    for line in lines {
        let new_block = match prev {
            Some((page, y, size)) => {
                page != line.page || (line.y - y) > params.block_gap_factor * size
            }
            None => true,
        };
        prev = Some((line.page, line.y, line.font_size));
        if new_block {
            blocks.push(TextBlock::new(line.page, line.spans));
        } else if let Some(block) = blocks.last_mut() {
            block.spans.extend(line.spans);
        }
    }
    blocks
}

pub fn build_blocks(spans: Vec<TextSpan>, params: &BlockParams) -> Vec<TextBlock> {
    group_into_blocks(group_into_lines(spans, params.line_tolerance), params)
}
