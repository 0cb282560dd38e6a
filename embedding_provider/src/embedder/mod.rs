use std::path::{Path, PathBuf};

use thiserror::Error;

mod hashed;
mod onnx;

pub use hashed::HashedEmbedder;
pub use onnx::{OnnxSentenceConfig, OnnxSentenceEmbedder};

/// Identifies the backing implementation that powers an embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OnnxSentence,
    Hashed,
}

/// Static metadata describing a particular embedder instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderInfo {
    pub provider: ProviderKind,
    pub embedding_model_id: String,
    pub dimension: usize,
}

/// Errors that can be produced by embedder operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbedderError {
    #[error("invalid embedder configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("provider failure: {message}")]
    ProviderFailure { message: String },
}

/// Core interface for all embedder implementations.
///
/// Implementations are deterministic: the same text always yields the same
/// vector, and `embed_batch` agrees with `embed` row by row.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError>;
    fn info(&self) -> &EmbedderInfo;
}

pub(crate) fn resolve_existing_path(path: &Path, description: &str) -> Result<PathBuf, EmbedderError> {
    std::fs::metadata(path).map_err(|_| EmbedderError::InvalidConfiguration {
        message: format!("{description} `{}` does not exist", path.display()),
    })?;

    path.canonicalize().map_err(|err| EmbedderError::ProviderFailure {
        message: format!("failed to canonicalize {description} `{}`: {err}", path.display()),
    })
}

pub(crate) fn provider_failure(context: &str, err: impl std::fmt::Display) -> EmbedderError {
    EmbedderError::ProviderFailure { message: format!("{context} failed: {err}") }
}
