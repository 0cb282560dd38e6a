//! Rank the sections of a PDF collection against its persona and task.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use embedding_provider::config::{default_minilm_config, MINILM_DEFAULTS};
use embedding_provider::EmbedderHandle;
use indicatif::ProgressBar;
use pdf_structure::PdfBackend;
use relevance_service::collection::OUTPUT_FILE;
use relevance_service::{write_report, ProgressEvent, ProgressFn, RelevanceService, ServiceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// MiniLM sentence model through ONNX Runtime
    Onnx,
    /// Bag-of-words hashing, no model files needed
    Hashed,
}

#[derive(Debug, Parser)]
#[command(name = "relevance-cli", about = "Rank collection sections for a persona and task")]
pub struct Cli {
    /// Collection directory holding challenge1b_input.json and PDFs/
    pub collection_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = EmbedderKind::Onnx)]
    pub embedder: EmbedderKind,
    #[arg(long, env = "OUTLINE_MODEL_PATH", default_value = MINILM_DEFAULTS.model_path)]
    pub model: PathBuf,
    #[arg(long, env = "OUTLINE_TOKENIZER_PATH", default_value = MINILM_DEFAULTS.tokenizer_path)]
    pub tokenizer: PathBuf,
    /// ONNX Runtime shared library
    #[arg(long, env = "ORT_DYLIB_PATH", default_value = MINILM_DEFAULTS.runtime_library_path)]
    pub runtime: PathBuf,
    /// Defaults to <collection_dir>/challenge1b_output.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long, default_value = "pure", env = "OUTLINE_PDF_BACKEND")]
    pub backend: PdfBackend,
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.collection_dir.join(OUTPUT_FILE))
    }

    pub fn embedder_handle(&self) -> EmbedderHandle {
        match self.embedder {
            EmbedderKind::Hashed => EmbedderHandle::hashed(MINILM_DEFAULTS.embedding_dimension),
            EmbedderKind::Onnx => {
                let mut config = default_minilm_config();
                config.model_path = self.model.clone();
                config.tokenizer_path = self.tokenizer.clone();
                config.runtime_library_path = self.runtime.clone();
                EmbedderHandle::onnx(config)
            }
        }
    }
}

fn progress_callback(pb: ProgressBar) -> ProgressFn {
    Box::new(move |event: ProgressEvent| match event {
        ProgressEvent::Start { total_documents } => pb.set_length(total_documents as u64),
        ProgressEvent::Document { name, .. } | ProgressEvent::DocumentFailed { name } => {
            pb.set_message(name);
            pb.inc(1);
        }
        ProgressEvent::Ranked { kept, .. } => pb.set_message(format!("refining {kept} sections")),
        ProgressEvent::Finished { .. } => pb.set_message("done"),
    })
}

/// Process the collection and write its report; returns the output path.
pub fn run(cli: &Cli, progress: &ProgressBar) -> Result<PathBuf> {
    let cfg = ServiceConfig { backend: cli.backend, ..ServiceConfig::default() };
    let embedder = cli.embedder_handle();
    if let Err(err) = embedder.get() {
        tracing::warn!(error = %err, "embedding model unavailable; ranking falls back to document order");
    }
    let service = RelevanceService::new(cfg, embedder);

    let report = service
        .process_collection(&cli.collection_dir, chrono::Utc::now(), Some(progress_callback(progress.clone())))
        .with_context(|| format!("processing collection {}", cli.collection_dir.display()))?;

    let out = cli.output_path();
    write_report(&report, &out).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(
        output = %out.display(),
        sections = report.extracted_sections.len(),
        snippets = report.sub_section_analysis.len(),
        "report written"
    );
    Ok(out)
}
