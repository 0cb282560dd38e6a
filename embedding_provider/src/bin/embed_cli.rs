use std::cmp::min;
use std::error::Error;

use embedding_provider::config::{default_minilm_config, MINILM_DEFAULTS};
use embedding_provider::{cosine_similarity, Embedder, HashedEmbedder, OnnxSentenceEmbedder};

// embed_cli [--hashed] <query> [| <text>]
fn main() -> Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let hashed = args.first().map(|a| a == "--hashed").unwrap_or(false);
    if hashed {
        args.remove(0);
    }

    let joined = args.join(" ");
    let mut parts = joined.splitn(2, '|').map(str::trim);
    let query = parts.next().filter(|q| !q.is_empty()).unwrap_or("sample text for embedding").to_string();
    let other = parts.next().map(str::to_string);

    let embedder: Box<dyn Embedder> = if hashed {
        Box::new(HashedEmbedder::new(MINILM_DEFAULTS.embedding_dimension)?)
    } else {
        println!("model path: {}", MINILM_DEFAULTS.model_path);
        println!("runtime library: {}", MINILM_DEFAULTS.runtime_library_path);
        Box::new(OnnxSentenceEmbedder::new(default_minilm_config())?)
    };

    let vector = embedder.embed(&query)?;
    println!("input: {query}");
    println!("vector length: {}", vector.len());
    let preview = &vector[..min(8, vector.len())];
    println!("first {} values: {preview:?}", preview.len());

    if let Some(other) = other {
        let other_vector = embedder.embed(&other)?;
        println!("cosine vs `{other}`: {:.4}", cosine_similarity(&vector, &other_vector));
    }
    Ok(())
}
