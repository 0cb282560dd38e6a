use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{Embedder, EmbedderError, EmbedderInfo, ProviderKind};
use crate::similarity::l2_normalize;

/// Bag-of-words feature hashing into a fixed number of signed buckets.
///
/// Texts sharing words land near each other, which is enough to exercise the
/// ranking code without model assets. `DefaultHasher::new()` uses fixed keys,
/// so vectors are stable across runs.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    info: EmbedderInfo,
}

impl HashedEmbedder {
    pub const MODEL_ID: &'static str = "hashed-bow-v1";

    pub fn new(dimension: usize) -> Result<Self, EmbedderError> {
        if dimension == 0 {
            return Err(EmbedderError::InvalidConfiguration {
                message: "dimension must be greater than zero".into(),
            });
        }
        Ok(Self {
            info: EmbedderInfo {
                provider: ProviderKind::Hashed,
                embedding_model_id: Self::MODEL_ID.into(),
                dimension,
            },
        })
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();
        let index = (hash % self.info.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl Embedder for HashedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut vector = vec![0f32; self.info.dimension];
        for token in tokens(text) {
            let (index, sign) = self.bucket(&token);
            vector[index] += sign;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_lowercased_alphanumeric_runs() {
        let got: Vec<String> = tokens("Hello, WORLD! it's 2024").collect();
        assert_eq!(got, vec!["hello", "world", "it", "s", "2024"]);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashedEmbedder::new(16).unwrap();
        assert!(e.embed("  ,.;").unwrap().iter().all(|v| *v == 0.0));
    }
}
