use std::fs;
use std::path::{Path, PathBuf};

use outline_model::CollectionInput;

use crate::ServiceError;

pub const INPUT_FILE: &str = "challenge1b_input.json";
pub const OUTPUT_FILE: &str = "challenge1b_output.json";
pub const PDF_DIR: &str = "PDFs";

#[derive(Debug, Clone)]
pub struct DocumentLimits {
    /// Below this a warning is logged but processing continues.
    pub warn_below: usize,
    /// Only the first `max_documents` found files are processed.
    pub max_documents: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self { warn_below: 3, max_documents: 10 }
    }
}

pub fn load_input_config(collection: &Path) -> Result<CollectionInput, ServiceError> {
    if !collection.is_dir() {
        return Err(ServiceError::CollectionNotFound(collection.to_path_buf()));
    }
    let path = collection.join(INPUT_FILE);
    let raw = fs::read_to_string(&path)
        .map_err(|err| ServiceError::Io(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| ServiceError::InvalidInput { path, message: err.to_string() })
}

/// Resolve listed file names under `<collection>/PDFs`, keeping list order.
pub fn find_pdf_files<S: AsRef<str>>(filenames: &[S], collection: &Path) -> Vec<PathBuf> {
    let pdf_dir = collection.join(PDF_DIR);
    if !pdf_dir.is_dir() {
        tracing::error!(dir = %pdf_dir.display(), "PDFs directory not found");
        return Vec::new();
    }
    filenames
        .iter()
        .filter_map(|name| {
            let path = pdf_dir.join(name.as_ref());
            if path.exists() {
                Some(path)
            } else {
                tracing::warn!(
                    file = name.as_ref(),
                    dir = %pdf_dir.display(),
                    "listed PDF not found"
                );
                None
            }
        })
        .collect()
}

pub fn limit_documents(
    mut found: Vec<PathBuf>,
    limits: &DocumentLimits,
) -> Result<Vec<PathBuf>, ServiceError> {
    if found.is_empty() {
        return Err(ServiceError::NoDocuments);
    }
    if found.len() < limits.warn_below {
        tracing::warn!(
            found = found.len(),
            "fewer than {} PDFs found; results may be limited",
            limits.warn_below
        );
    }
    if found.len() > limits.max_documents {
        tracing::warn!(
            found = found.len(),
            max = limits.max_documents,
            "more than {} PDFs found; only the first {} are processed",
            limits.max_documents,
            limits.max_documents
        );
        found.truncate(limits.max_documents);
    }
    Ok(found)
}

pub fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
