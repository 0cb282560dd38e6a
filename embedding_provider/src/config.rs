use std::path::PathBuf;

use crate::embedder::OnnxSentenceConfig;

/// Default settings for the bundled MiniLM sentence model.
#[derive(Debug, Clone, Copy)]
pub struct MiniLmDefaults {
    pub model_path: &'static str,
    pub tokenizer_path: &'static str,
    pub runtime_library_path: &'static str,
    pub embedding_dimension: usize,
    pub max_input_tokens: usize,
    pub embedding_model_id: &'static str,
    pub pad_token: &'static str,
}

pub const MINILM_DEFAULTS: MiniLmDefaults = MiniLmDefaults {
    model_path: "models/all-MiniLM-L6-v2/model.onnx",
    tokenizer_path: "models/all-MiniLM-L6-v2/tokenizer.json",
    runtime_library_path: "lib/libonnxruntime.so",
    embedding_dimension: 384,
    max_input_tokens: 256,
    embedding_model_id: "all-MiniLM-L6-v2",
    pad_token: "[PAD]",
};

/// MiniLM configuration with paths relative to the working directory.
pub fn default_minilm_config() -> OnnxSentenceConfig {
    OnnxSentenceConfig {
        model_path: PathBuf::from(MINILM_DEFAULTS.model_path),
        runtime_library_path: PathBuf::from(MINILM_DEFAULTS.runtime_library_path),
        tokenizer_path: PathBuf::from(MINILM_DEFAULTS.tokenizer_path),
        dimension: MINILM_DEFAULTS.embedding_dimension,
        max_input_length: MINILM_DEFAULTS.max_input_tokens,
        embedding_model_id: MINILM_DEFAULTS.embedding_model_id.to_string(),
        pad_token: MINILM_DEFAULTS.pad_token.to_string(),
    }
}
