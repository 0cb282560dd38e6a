//! Sentence embeddings for relevance ranking.
//!
//! [`Embedder`] is the seam the ranking code depends on. The ONNX
//! implementation runs a MiniLM sentence-transformer; the hashed one needs no
//! assets and is used in tests and offline runs.

pub mod config;
pub mod embedder;
pub mod handle;
pub mod similarity;

pub use embedder::{Embedder, EmbedderError, EmbedderInfo, HashedEmbedder, OnnxSentenceConfig, OnnxSentenceEmbedder, ProviderKind};
pub use handle::EmbedderHandle;
pub use similarity::{cosine_similarity, l2_normalize};
