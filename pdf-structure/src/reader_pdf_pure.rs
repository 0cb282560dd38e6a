//! Pure-Rust PDF reader built on `lopdf`. Behind feature `pure-pdf`.
//!
//! Walks each page's content stream and emits one run per text-showing
//! operator, with the effective font size, a top-left origin position and
//! bold/italic flags derived from the font's `BaseFont` name.

#![cfg(feature = "pure-pdf")]

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use outline_model::{DocumentLayout, TextSpan};

use crate::reader_pdf::ReadError;
use crate::unified_blocks::{build_blocks, BlockParams};

/// TJ adjustments at or below this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;
/// Average glyph width as a fraction of the font size, for advancing x.
const APPROX_GLYPH_WIDTH: f32 = 0.5;
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

pub fn read_pdf_layout_pure(path: &Path, params: &BlockParams) -> Result<DocumentLayout, ReadError> {
    let doc = Document::load(path).map_err(|e| ReadError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if doc.is_encrypted() {
        return Err(ReadError::Encrypted(path.display().to_string()));
    }
    Ok(layout_from_document(&doc, params))
}

pub fn read_pdf_layout_mem(bytes: &[u8], params: &BlockParams) -> Result<DocumentLayout, ReadError> {
    let doc = Document::load_mem(bytes).map_err(|e| ReadError::Parse(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(ReadError::Encrypted("<memory>".into()));
    }
    Ok(layout_from_document(&doc, params))
}

fn layout_from_document(doc: &Document, params: &BlockParams) -> DocumentLayout {
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;
    let mut spans = Vec::new();
    for (page_num, page_id) in pages {
        match page_runs(doc, page_id, page_num) {
            Ok(runs) => spans.extend(runs),
            Err(err) => tracing::warn!(page = page_num, error = %err, "skipping unreadable page"),
        }
    }
    tracing::debug!(pages = page_count, runs = spans.len(), "extracted text runs");
    DocumentLayout { page_count, blocks: build_blocks(spans, params) }
}

#[derive(Debug, Clone, Default)]
struct FontInfo {
    identity: bool,
    bold: bool,
    italic: bool,
}

impl FontInfo {
    fn from_base_font(base_font: &str, encoding: Option<&str>) -> Self {
        let lower = base_font.to_ascii_lowercase();
        Self {
            identity: encoding.is_some_and(|e| e.contains("Identity")),
            bold: ["bold", "black", "heavy", "semibold"].iter().any(|k| lower.contains(k)),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }
}

fn page_fonts(doc: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, FontInfo> {
    let fonts = match doc.get_page_fonts(page_id) {
        Ok(f) => f,
        Err(_) => return BTreeMap::new(),
    };
    fonts
        .into_iter()
        .map(|(name, dict)| {
            let base_font = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_default();
            let encoding = dict.get(b"Encoding").ok().and_then(|o| match o {
                Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                _ => None,
            });
            (name, FontInfo::from_base_font(&base_font, encoding.as_deref()))
        })
        .collect()
}

fn page_top(doc: &Document, page_id: ObjectId) -> f32 {
    fn find_media_box(doc: &Document, dict: &lopdf::Dictionary, depth: usize) -> Option<Vec<f32>> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = match obj {
                Object::Array(a) => Some(a.clone()),
                Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_array().ok().cloned()),
                _ => None,
            };
            if let Some(arr) = arr {
                let nums: Vec<f32> = arr.iter().filter_map(get_number).collect();
                if nums.len() == 4 {
                    return Some(nums);
                }
            }
        }
        if depth > 16 {
            return None;
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent_dict = doc.get_object(parent).ok()?.as_dict().ok()?;
        find_media_box(doc, parent_dict, depth + 1)
    }

    doc.get_object(page_id)
        .ok()
        .and_then(|o| o.as_dict().ok())
        .and_then(|d| find_media_box(doc, d, 0))
        .map(|b| b[3].max(b[1]))
        .unwrap_or(DEFAULT_PAGE_HEIGHT)
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

type Matrix = [f32; 6];
const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn mul(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Text-state machine for one page.
struct PageWalker<'a> {
    doc_fonts: &'a BTreeMap<Vec<u8>, FontInfo>,
    page: u32,
    top: f32,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    tm: Matrix,
    lm: Matrix,
    leading: f32,
    font: FontInfo,
    font_size: f32,
    in_text: bool,
    runs: Vec<TextSpan>,
}

impl<'a> PageWalker<'a> {
    fn new(doc_fonts: &'a BTreeMap<Vec<u8>, FontInfo>, page: u32, top: f32) -> Self {
        Self {
            doc_fonts,
            page,
            top,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            tm: IDENTITY,
            lm: IDENTITY,
            leading: 0.0,
            font: FontInfo::default(),
            font_size: 12.0,
            in_text: false,
            runs: Vec::new(),
        }
    }

    fn next_line(&mut self) {
        let leading = if self.leading > 0.0 { self.leading } else { self.font_size * 1.2 };
        self.lm = mul(&translate(0.0, -leading), &self.lm);
        self.tm = self.lm;
    }

    fn decode(&self, bytes: &[u8]) -> String {
        if self.font.identity && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }
        decode_text_simple(bytes)
    }

    fn show(&mut self, text: String) {
        if !self.in_text {
            return;
        }
        let rm = mul(&self.tm, &self.ctm);
        let scale = (rm[2] * rm[2] + rm[3] * rm[3]).sqrt();
        let size = ((self.font_size * scale) * 100.0).round() / 100.0;
        let advance = text.chars().count() as f32 * self.font_size * APPROX_GLYPH_WIDTH;
        self.tm = mul(&translate(advance, 0.0), &self.tm);

        let cleaned = clean_text(&text);
        if cleaned.is_empty() {
            return;
        }
        self.runs.push(TextSpan {
            text: cleaned,
            font_size: size,
            bold: self.font.bold,
            italic: self.font.italic,
            page: self.page,
            x: rm[4],
            y: self.top - rm[5],
        });
    }

    fn string_operand(&self, obj: &Object) -> Option<String> {
        match obj {
            Object::String(bytes, _) => Some(self.decode(bytes)),
            _ => None,
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        let num = |i: usize| operands.get(i).and_then(get_number);
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(m) = self.ctm_stack.pop() {
                    self.ctm = m;
                }
            }
            "cm" => {
                if operands.len() >= 6 {
                    let mut m = IDENTITY;
                    for (i, slot) in m.iter_mut().enumerate() {
                        *slot = num(i).unwrap_or(IDENTITY[i]);
                    }
                    self.ctm = mul(&m, &self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.tm = IDENTITY;
                self.lm = IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                    self.font = self.doc_fonts.get(name).cloned().unwrap_or_default();
                }
                if let Some(size) = num(1) {
                    self.font_size = size;
                }
            }
            "TL" => self.leading = num(0).unwrap_or(0.0),
            "Td" | "TD" => {
                let tx = num(0).unwrap_or(0.0);
                let ty = num(1).unwrap_or(0.0);
                if operator == "TD" {
                    self.leading = -ty;
                }
                self.lm = mul(&translate(tx, ty), &self.lm);
                self.tm = self.lm;
            }
            "Tm" => {
                if operands.len() >= 6 {
                    for i in 0..6 {
                        self.tm[i] = num(i).unwrap_or(IDENTITY[i]);
                    }
                    self.lm = self.tm;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(|o| self.string_operand(o)) {
                    self.show(text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(text) = operands.first().and_then(|o| self.string_operand(o)) {
                    self.show(text);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(text) = operands.get(2).and_then(|o| self.string_operand(o)) {
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(Ok(items)) = operands.first().map(|o| o.as_array()) {
                    let mut combined = String::new();
                    for item in items {
                        if let Some(text) = self.string_operand(item) {
                            combined.push_str(&text);
                        } else if let Some(adj) = get_number(item) {
                            if adj <= TJ_SPACE_THRESHOLD && !combined.ends_with(' ') {
                                combined.push(' ');
                            }
                        }
                    }
                    self.show(combined);
                }
            }
            _ => {}
        }
    }
}

fn page_runs(doc: &Document, page_id: ObjectId, page_num: u32) -> Result<Vec<TextSpan>, ReadError> {
    let fonts = page_fonts(doc, page_id);
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| ReadError::Parse(format!("cannot get page content: {e}")))?;
    let content = Content::decode(&data)
        .map_err(|e| ReadError::Parse(format!("content stream decode error: {e}")))?;

    let mut walker = PageWalker::new(&fonts, page_num, page_top(doc, page_id));
    for op in &content.operations {
        walker.apply(op.operator.as_str(), &op.operands);
    }
    Ok(walker.runs)
}

/// Best-effort decoding of raw PDF string bytes: UTF-16BE with BOM, UTF-8,
/// then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn clean_text(text: &str) -> String {
    text.replace('\r', "").replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bom_utf8_and_latin1() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x30, 0x42]), "Aあ");
        assert_eq!(decode_text_simple("café".as_bytes()), "café");
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "café");
    }

    #[test]
    fn font_flags_from_base_font() {
        let f = FontInfo::from_base_font("ABCDEF+Arial-BoldItalicMT", None);
        assert!(f.bold && f.italic && !f.identity);
        let g = FontInfo::from_base_font("NotoSansCJK-Regular", Some("Identity-H"));
        assert!(!g.bold && g.identity);
    }

    #[test]
    fn matrix_product_translates() {
        let m = mul(&translate(10.0, 5.0), &[2.0, 0.0, 0.0, 2.0, 100.0, 700.0]);
        assert_eq!(m, [2.0, 0.0, 0.0, 2.0, 120.0, 710.0]);
    }
}
