//! Persona-driven section ranking over a collection of PDFs.

pub mod assemble;
pub mod collection;
pub mod salience;
pub mod subsection;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use embedding_provider::EmbedderHandle;
use outline_model::{RelevanceReport, Section, SubsectionSnippet};
use pdf_structure::{extract_sections, PdfBackend, SegmentParams, SentenceTokenizer, UnicodeSentenceTokenizer};

pub use assemble::{build_report, BackfillParams, ReportInput};
pub use collection::{find_pdf_files, limit_documents, load_input_config, DocumentLimits};
pub use salience::{adaptive_threshold, persona_query, rank_sections, RankingParams};
pub use subsection::{refine_subsections, RefineParams};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("collection directory not found: {0}")]
    CollectionNotFound(PathBuf),
    #[error("invalid input config {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },
    #[error("no PDF files found")]
    NoDocuments,
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend: PdfBackend,
    pub segment: SegmentParams,
    pub ranking: RankingParams,
    pub refine: RefineParams,
    pub backfill: BackfillParams,
    pub limits: DocumentLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend: pdf_structure::default_backend(),
            segment: SegmentParams::default(),
            ranking: RankingParams::default(),
            refine: RefineParams::default(),
            backfill: BackfillParams::default(),
            limits: DocumentLimits::default(),
        }
    }
}

/// Progress events emitted while a collection is analysed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Start { total_documents: usize },
    Document { name: String, sections: usize },
    DocumentFailed { name: String },
    Ranked { pool: usize, kept: usize },
    Finished { sections: usize, snippets: usize },
}

pub type ProgressFn = Box<dyn FnMut(ProgressEvent) + Send>;

pub struct RelevanceService {
    cfg: ServiceConfig,
    embedder: EmbedderHandle,
    tokenizer: Box<dyn SentenceTokenizer>,
}

impl RelevanceService {
    pub fn new(cfg: ServiceConfig, embedder: EmbedderHandle) -> Self {
        Self { cfg, embedder, tokenizer: Box::new(UnicodeSentenceTokenizer) }
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn SentenceTokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.cfg
    }

    /// Segment every document, in order, into one pool. A document that
    /// cannot be read is logged and skipped.
    pub fn collect_sections(&self, pdfs: &[PathBuf], progress: &mut Option<ProgressFn>) -> Vec<Section> {
        let mut pool = Vec::new();
        for path in pdfs {
            let name = collection::file_name(path);
            match extract_sections(path, self.cfg.backend, &name, &self.cfg.segment) {
                Ok(sections) => {
                    tracing::info!(file = %name, sections = sections.len(), "sections extracted");
                    if let Some(cb) = progress.as_deref_mut() {
                        cb(ProgressEvent::Document { name, sections: sections.len() });
                    }
                    pool.extend(sections);
                }
                Err(err) => {
                    tracing::warn!(file = %name, error = %err, "skipping document");
                    if let Some(cb) = progress.as_deref_mut() {
                        cb(ProgressEvent::DocumentFailed { name });
                    }
                }
            }
        }
        pool
    }

    /// Rank a section pool for `persona` and `task` and assemble the report.
    pub fn analyze_sections(
        &self,
        input_documents: Vec<String>,
        pool: &[Section],
        persona: &str,
        task: &str,
        now: DateTime<Utc>,
        progress: &mut Option<ProgressFn>,
    ) -> RelevanceReport {
        let query = persona_query(persona, task);
        tracing::info!(%query, sections = pool.len(), "ranking sections");

        let ranked = rank_sections(pool, &query, &self.embedder, &self.cfg.ranking);
        if let Some(cb) = progress.as_deref_mut() {
            cb(ProgressEvent::Ranked { pool: pool.len(), kept: ranked.len() });
        }

        let mut snippets = Vec::new();
        for r in &ranked {
            let sentences =
                refine_subsections(&r.section, &query, &self.embedder, self.tokenizer.as_ref(), &self.cfg.refine);
            snippets.extend(sentences.into_iter().map(|refined_text| SubsectionSnippet {
                document: r.section.document.clone(),
                page: r.section.page,
                refined_text,
            }));
        }

        let report = build_report(
            ReportInput { input_documents, persona, task, pool, ranked: &ranked, snippets },
            &self.cfg.backfill,
            now,
        );
        tracing::info!(
            sections = report.extracted_sections.len(),
            snippets = report.sub_section_analysis.len(),
            "report assembled"
        );
        if let Some(cb) = progress.as_deref_mut() {
            cb(ProgressEvent::Finished {
                sections: report.extracted_sections.len(),
                snippets: report.sub_section_analysis.len(),
            });
        }
        report
    }

    /// Analyse explicit PDF paths.
    pub fn analyze_documents(
        &self,
        pdfs: &[PathBuf],
        persona: &str,
        task: &str,
        now: DateTime<Utc>,
        mut progress: Option<ProgressFn>,
    ) -> RelevanceReport {
        if let Some(cb) = progress.as_deref_mut() {
            cb(ProgressEvent::Start { total_documents: pdfs.len() });
        }
        let pool = self.collect_sections(pdfs, &mut progress);
        let names = pdfs.iter().map(|p| collection::file_name(p)).collect();
        self.analyze_sections(names, &pool, persona, task, now, &mut progress)
    }

    /// Load `<collection>/challenge1b_input.json`, resolve its PDFs and
    /// analyse them.
    pub fn process_collection(
        &self,
        collection: &Path,
        now: DateTime<Utc>,
        progress: Option<ProgressFn>,
    ) -> Result<RelevanceReport, ServiceError> {
        let input = load_input_config(collection)?;
        tracing::info!(
            persona = %input.persona.role,
            task = %input.job_to_be_done.task,
            documents = input.documents.len(),
            "loaded collection config"
        );
        let names = input.filenames();
        let found = find_pdf_files(&names[..], collection);
        let pdfs = limit_documents(found, &self.cfg.limits)?;
        Ok(self.analyze_documents(&pdfs, &input.persona.role, &input.job_to_be_done.task, now, progress))
    }
}

/// Write a report as 2-space indented JSON; non-ASCII text is kept as is.
pub fn write_report(report: &RelevanceReport, path: &Path) -> Result<(), ServiceError> {
    let json = serde_json::to_string_pretty(report).map_err(|err| ServiceError::Serialize(err.to_string()))?;
    fs::write(path, json).map_err(|err| ServiceError::Io(format!("{}: {err}", path.display())))
}
