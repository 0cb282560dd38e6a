use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::embedder::{
    Embedder, EmbedderError, HashedEmbedder, OnnxSentenceConfig, OnnxSentenceEmbedder,
};

type Loader = Box<dyn Fn() -> Result<Arc<dyn Embedder>, EmbedderError> + Send + Sync>;

/// Lazily loaded, read-only embedder shared for the lifetime of the process.
///
/// The model is loaded on the first [`EmbedderHandle::get`] and the outcome is
/// kept for the lifetime of the handle. A failed load is logged once and every
/// later call returns the same error without touching the model files again.
pub struct EmbedderHandle {
    cell: OnceLock<Result<Arc<dyn Embedder>, EmbedderError>>,
    loader: Loader,
}

impl EmbedderHandle {
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>, EmbedderError> + Send + Sync + 'static,
    {
        Self { cell: OnceLock::new(), loader: Box::new(loader) }
    }

    /// Handle over the ONNX sentence model described by `config`.
    pub fn onnx(config: OnnxSentenceConfig) -> Self {
        Self::lazy(move || {
            Ok(Arc::new(OnnxSentenceEmbedder::new(config.clone())?) as Arc<dyn Embedder>)
        })
    }

    pub fn hashed(dimension: usize) -> Self {
        Self::lazy(move || Ok(Arc::new(HashedEmbedder::new(dimension)?) as Arc<dyn Embedder>))
    }

    /// Handle around an embedder that is already constructed.
    pub fn ready(embedder: Arc<dyn Embedder>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(embedder.clone()));
        Self {
            cell,
            loader: Box::new(move || Ok(embedder.clone())),
        }
    }

    pub fn get(&self) -> Result<Arc<dyn Embedder>, EmbedderError> {
        self.cell
            .get_or_init(|| {
                let loaded = (self.loader)();
                match &loaded {
                    Ok(embedder) => {
                        tracing::info!(
                            model = %embedder.info().embedding_model_id,
                            "embedding model loaded"
                        );
                    }
                    Err(err) => tracing::warn!(error = %err, "embedding model unavailable"),
                }
                loaded
            })
            .clone()
    }

    /// True once a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }
}

impl fmt::Debug for EmbedderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderHandle").field("loaded", &self.is_loaded()).finish()
    }
}
