use std::path::Path;
use std::str::FromStr;

use outline_model::{DocumentLayout, TextSpan};
use thiserror::Error;

use crate::unified_blocks::{build_blocks, BlockParams};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {path}: {message}")]
    Open { path: String, message: String },
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("{0} is encrypted")]
    Encrypted(String),
    #[error("PDF backend '{0}' is not enabled in this build")]
    BackendUnavailable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBackend {
    /// Fixed sample layout, independent of the input file.
    Stub,
    PureRust,
}

impl PdfBackend {
    pub fn name(self) -> &'static str {
        match self {
            PdfBackend::Stub => "stub",
            PdfBackend::PureRust => "pure",
        }
    }
}

impl FromStr for PdfBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stub" => Ok(PdfBackend::Stub),
            "pure" | "pure-rust" | "lopdf" => Ok(PdfBackend::PureRust),
            other => Err(format!("unknown PDF backend '{other}' (expected pure|stub)")),
        }
    }
}

/// Select the default backend based on enabled cargo features.
pub fn default_backend() -> PdfBackend {
    if cfg!(feature = "pure-pdf") {
        PdfBackend::PureRust
    } else {
        PdfBackend::Stub
    }
}

pub fn read_pdf_layout_with(
    path: &Path,
    backend: PdfBackend,
    params: &BlockParams,
) -> Result<DocumentLayout, ReadError> {
    match backend {
        PdfBackend::Stub => Ok(read_pdf_stub(params)),
        PdfBackend::PureRust => {
            #[cfg(feature = "pure-pdf")]
            {
                return crate::reader_pdf_pure::read_pdf_layout_pure(path, params);
            }
            #[allow(unreachable_code)]
            {
                let _ = path;
                Err(ReadError::BackendUnavailable(backend.name()))
            }
        }
    }
}

/// Read a PDF into blocks of positioned runs with default grouping.
pub fn read_pdf_layout(path: &Path, backend: PdfBackend) -> Result<DocumentLayout, ReadError> {
    read_pdf_layout_with(path, backend, &BlockParams::default())
}

fn read_pdf_stub(params: &BlockParams) -> DocumentLayout {
    // A small two-page document to exercise both pipelines without a real file.
    let spans = vec![
        TextSpan::new("第1章 概要", 18.0, 1).bold().at(72.0, 72.0),
        TextSpan::new("これはPDFから抽出されたテキストのサンプルです。", 10.0, 1).at(72.0, 120.0),
        TextSpan::new("複数ページにまたがる場合があります。", 10.0, 1).at(72.0, 132.0),
        TextSpan::new("1.1 Scope of the sample", 14.0, 1).bold().at(72.0, 200.0),
        TextSpan::new("The stub backend returns fixed runs for demonstration.", 10.0, 1).at(72.0, 230.0),
        TextSpan::new("It never opens the input file.", 10.0, 1).at(72.0, 242.0),
        TextSpan::new("1.2 詳細", 14.0, 2).bold().at(72.0, 72.0),
        TextSpan::new("箇条書き項目の例と、さらに詳しい説明を含む段落です。", 10.0, 2).at(72.0, 110.0),
    ];
    DocumentLayout { page_count: 2, blocks: build_blocks(spans, params) }
}
