use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use ndarray::Array2;
use ort::{session::Session, value::Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationParams};

use super::{provider_failure, resolve_existing_path, Embedder, EmbedderError, EmbedderInfo, ProviderKind};
use crate::similarity::l2_normalize;

/// Configuration for a local sentence-transformer exported to ONNX.
#[derive(Debug, Clone)]
pub struct OnnxSentenceConfig {
    pub model_path: PathBuf,
    pub runtime_library_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub dimension: usize,
    pub max_input_length: usize,
    pub embedding_model_id: String,
    pub pad_token: String,
}

/// Sentence embedder running a BERT-style encoder through the ONNX Runtime
/// shared library. Output is the attention-masked mean of the last hidden
/// state, L2 normalised.
#[derive(Debug)]
pub struct OnnxSentenceEmbedder {
    info: EmbedderInfo,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    pad_id: i64,
    feeds_token_type_ids: bool,
}

struct PreparedBatch {
    input_ids: Tensor<i64>,
    attention_mask: Tensor<i64>,
    token_type_ids: Tensor<i64>,
    attention_rows: Vec<Vec<i64>>,
    seq_len: usize,
}

static ORT_RUNTIME_PATH: OnceLock<PathBuf> = OnceLock::new();

impl OnnxSentenceEmbedder {
    pub fn new(config: OnnxSentenceConfig) -> Result<Self, EmbedderError> {
        if config.dimension == 0 {
            return Err(EmbedderError::InvalidConfiguration {
                message: "dimension must be greater than zero".into(),
            });
        }

        if config.max_input_length == 0 {
            return Err(EmbedderError::InvalidConfiguration {
                message: "max_input_length must be greater than zero".into(),
            });
        }

        let runtime_library_path =
            resolve_existing_path(&config.runtime_library_path, "ONNX Runtime shared library")?;

        ensure_ort_initialized(&runtime_library_path)?;

        let model_path = resolve_existing_path(&config.model_path, "ONNX model")?;
        let tokenizer_path = resolve_existing_path(&config.tokenizer_path, "tokenizer config")?;

        let session = Session::builder()
            .map_err(|err| provider_failure("create session builder", err))?
            .commit_from_file(&model_path)
            .map_err(|err| provider_failure("load ONNX model", err))?;
        let feeds_token_type_ids = session.inputs.iter().any(|input| input.name == "token_type_ids");

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|err| provider_failure("load tokenizer", err))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_input_length,
                ..Default::default()
            }))
            .map_err(|err| provider_failure("configure truncation", err))?;

        let pad_id = tokenizer.token_to_id(&config.pad_token).ok_or_else(|| {
            EmbedderError::InvalidConfiguration {
                message: format!(
                    "tokenizer `{}` does not declare a `{}` token",
                    tokenizer_path.display(),
                    config.pad_token
                ),
            }
        })? as i64;

        tracing::debug!(
            model = %model_path.display(),
            dimension = config.dimension,
            max_tokens = config.max_input_length,
            feeds_token_type_ids,
            "sentence embedder loaded"
        );

        Ok(Self {
            info: EmbedderInfo {
                provider: ProviderKind::OnnxSentence,
                embedding_model_id: config.embedding_model_id,
                dimension: config.dimension,
            },
            session: Mutex::new(session),
            tokenizer,
            pad_id,
            feeds_token_type_ids,
        })
    }

    fn prepare_encodings(&self, texts: &[&str]) -> Result<Vec<Encoding>, EmbedderError> {
        texts
            .iter()
            .map(|t| self.tokenizer.encode(*t, true))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| provider_failure("tokenize inputs", err))
    }

    fn build_input_tensors(&self, encodings: &[Encoding]) -> Result<PreparedBatch, EmbedderError> {
        let batch = encodings.len();
        let seq_len = encodings.iter().map(Encoding::len).max().unwrap_or(0);

        let mut input_ids = Array2::<i64>::from_elem((batch, seq_len), self.pad_id);
        let mut attention_mask = Array2::<i64>::zeros((batch, seq_len));
        let mut token_type_ids = Array2::<i64>::zeros((batch, seq_len));
        let mut attention_rows = Vec::with_capacity(batch);

        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();

            for col in 0..ids.len() {
                input_ids[(row, col)] = ids[col] as i64;
                attention_mask[(row, col)] = mask[col] as i64;
                token_type_ids[(row, col)] = types.get(col).copied().unwrap_or(0) as i64;
            }

            attention_rows.push(attention_mask.row(row).to_vec());
        }

        Ok(PreparedBatch {
            input_ids: Tensor::from_array(input_ids).map_err(|err| provider_failure("prepare input_ids", err))?,
            attention_mask: Tensor::from_array(attention_mask)
                .map_err(|err| provider_failure("prepare attention_mask", err))?,
            token_type_ids: Tensor::from_array(token_type_ids)
                .map_err(|err| provider_failure("prepare token_type_ids", err))?,
            attention_rows,
            seq_len,
        })
    }

    fn run_session(
        &self,
        input_ids: Tensor<i64>,
        attention_mask: Tensor<i64>,
        token_type_ids: Tensor<i64>,
    ) -> Result<(Vec<f32>, [usize; 3]), EmbedderError> {
        let mut session = self.session.lock().map_err(|_| EmbedderError::ProviderFailure {
            message: "ONNX session lock poisoned".into(),
        })?;
        let outputs = if self.feeds_token_type_ids {
            session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
        }
        .map_err(|err| provider_failure("execute ONNX session", err))?;

        // last_hidden_state comes first
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|err| provider_failure("extract output tensor", err))?;

        let dims: Vec<usize> = shape.iter().map(|d| usize::try_from(*d).unwrap_or(0)).collect();
        match dims.as_slice() {
            &[batch, seq_len, hidden] => Ok((data.to_vec(), [batch, seq_len, hidden])),
            _ => Err(EmbedderError::ProviderFailure {
                message: format!("model output must be rank-3 [batch, seq_len, hidden], got shape {dims:?}"),
            }),
        }
    }

    fn embed_encoded(&self, encodings: &[Encoding]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let PreparedBatch {
            input_ids,
            attention_mask,
            token_type_ids,
            attention_rows,
            seq_len: expected_seq_len,
        } = self.build_input_tensors(encodings)?;

        let (raw, [batch, seq_len, hidden]) = self.run_session(input_ids, attention_mask, token_type_ids)?;

        if batch != attention_rows.len() {
            return Err(EmbedderError::ProviderFailure {
                message: format!(
                    "model returned batch size {batch}, but prepared {} attention masks",
                    attention_rows.len()
                ),
            });
        }
        if seq_len != expected_seq_len {
            return Err(EmbedderError::ProviderFailure {
                message: format!("model returned sequence length {seq_len}, expected {expected_seq_len}"),
            });
        }
        if hidden != self.info.dimension {
            return Err(EmbedderError::ProviderFailure {
                message: format!(
                    "model hidden size {hidden} does not match configured dimension {}",
                    self.info.dimension
                ),
            });
        }

        Ok(mean_pool(&raw, &attention_rows, seq_len, hidden))
    }
}

fn mean_pool(data: &[f32], attention_rows: &[Vec<i64>], seq_len: usize, hidden: usize) -> Vec<Vec<f32>> {
    attention_rows
        .iter()
        .enumerate()
        .map(|(b, mask)| {
            let mut sum = vec![0f32; hidden];
            let mut count = 0f32;
            for (t, m) in mask.iter().enumerate().take(seq_len) {
                if *m == 1 {
                    let base = (b * seq_len + t) * hidden;
                    for (acc, v) in sum.iter_mut().zip(&data[base..base + hidden]) {
                        *acc += v;
                    }
                    count += 1.0;
                }
            }
            if count > 0.0 {
                sum.iter_mut().for_each(|v| *v /= count);
            }
            l2_normalize(&mut sum);
            sum
        })
        .collect()
}

impl Embedder for OnnxSentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let encodings = self.prepare_encodings(&[text])?;
        self.embed_encoded(&encodings)?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::ProviderFailure { message: "missing pooled output".into() })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let encodings = self.prepare_encodings(texts)?;
        self.embed_encoded(&encodings)
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

fn ensure_ort_initialized(runtime_library_path: &Path) -> Result<(), EmbedderError> {
    if let Some(existing) = ORT_RUNTIME_PATH.get() {
        if existing != runtime_library_path {
            return Err(EmbedderError::InvalidConfiguration {
                message: format!(
                    "ONNX Runtime already initialized with library `{}`; cannot reinitialize with `{}`",
                    existing.display(),
                    runtime_library_path.display()
                ),
            });
        }
        return Ok(());
    }

    ort::init_from(runtime_library_path.to_string_lossy().to_string())
        .with_name("doc-outline")
        .commit()
        .map_err(|err| provider_failure("initialize ONNX Runtime environment", err))?;
    let _ = ORT_RUNTIME_PATH.set(runtime_library_path.to_path_buf());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_ignores_padding_and_normalises() {
        // batch 1, seq 3, hidden 2; last token is padding
        let data = [3.0, 0.0, 1.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&data, &[vec![1, 1, 0]], 3, 2);
        let v = &pooled[0];
        assert!((v[0] - 2.0 / 8f32.sqrt()).abs() < 1e-6);
        assert!((v[1] - 2.0 / 8f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn missing_runtime_is_a_configuration_error() {
        let config = OnnxSentenceConfig {
            model_path: "/nonexistent/model.onnx".into(),
            runtime_library_path: "/nonexistent/libonnxruntime.so".into(),
            tokenizer_path: "/nonexistent/tokenizer.json".into(),
            dimension: 384,
            max_input_length: 256,
            embedding_model_id: "test".into(),
            pad_token: "[PAD]".into(),
        };
        let err = OnnxSentenceEmbedder::new(config).expect_err("missing runtime");
        assert!(matches!(err, EmbedderError::InvalidConfiguration { .. }));
    }
}
