//! Batch heading-outline extraction: one JSON file per input PDF.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use outline_model::Outline;
use pdf_structure::{process_pdf, HeadingParams, LanguageDetector, PdfBackend, ScriptLanguageDetector};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

#[derive(Debug, Parser)]
#[command(name = "outline-cli", about = "Extract title and heading outline from every PDF in a directory")]
pub struct Cli {
    /// Directory scanned for *.pdf files
    pub input_dir: PathBuf,
    /// Directory receiving <stem>.json per document
    pub output_dir: PathBuf,
    /// PDF reader backend (pure|stub)
    #[arg(long, default_value = "pure", env = "OUTLINE_PDF_BACKEND")]
    pub backend: PdfBackend,
    /// Log per-span decisions
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// PDFs directly inside `dir`, sorted by file name.
pub fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| p.extension().map(|e| e.eq_ignore_ascii_case("pdf")).unwrap_or(false))
        .collect();
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

/// Pretty JSON with 4-space indentation. Non-ASCII text is written as is.
pub fn to_json_4space<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

pub fn write_outline(outline: &Outline, path: &Path) -> Result<()> {
    let json = to_json_4space(outline)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Outline every PDF in `input_dir` into `output_dir`. Unreadable documents
/// are logged and skipped; a missing input directory is an error.
pub fn process_dir(
    input_dir: &Path,
    output_dir: &Path,
    backend: PdfBackend,
    detector: &dyn LanguageDetector,
    params: &HeadingParams,
    progress: &ProgressBar,
) -> Result<BatchSummary> {
    if !input_dir.is_dir() {
        bail!("input directory not found: {}", input_dir.display());
    }
    fs::create_dir_all(output_dir).with_context(|| format!("creating {}", output_dir.display()))?;

    let files = pdf_files(input_dir)?;
    tracing::info!(count = files.len(), dir = %input_dir.display(), "found PDFs");
    progress.set_length(files.len() as u64);

    let mut summary = BatchSummary::default();
    for pdf in files {
        let name = pdf.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        progress.set_message(name.clone());
        let stem = pdf.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let out = output_dir.join(format!("{stem}.json"));
        let written = process_pdf(&pdf, backend, detector, params)
            .map_err(anyhow::Error::from)
            .and_then(|outline| write_outline(&outline, &out).map(|()| outline));
        match written {
            Ok(outline) => {
                tracing::info!(
                    file = %name,
                    title = %outline.title,
                    entries = outline.outline.len(),
                    "wrote outline"
                );
                summary.written.push(out);
            }
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "skipping document");
                summary.failed.push(pdf);
            }
        }
        progress.inc(1);
    }
    Ok(summary)
}

pub fn run(cli: &Cli, progress: &ProgressBar) -> Result<BatchSummary> {
    process_dir(
        &cli.input_dir,
        &cli.output_dir,
        cli.backend,
        &ScriptLanguageDetector::new(),
        &HeadingParams::default(),
        progress,
    )
}
