//! Embedding generation and token accounting.
//!
//! The index core treats both as opaque collaborators: text goes in, a
//! vector (or a token count) comes out.

mod openai;

pub use openai::{
    OpenAIEmbedder, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, EMBEDDING_TOKEN_LIMIT,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Trait for counting model tokens in a text.
///
/// Used to keep chapters under the embedding model's input cap without
/// shipping a full tokenizer.
pub trait TokenCounter: Send + Sync {
    /// Number of model tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Token counter using the ~4 bytes per token estimate.
///
/// Good enough for budget filtering: English transcript text lands close to
/// the real cl100k count, and the budget has headroom for the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatingTokenCounter;

impl TokenCounter for EstimatingTokenCounter {
    fn count(&self, text: &str) -> usize {
        (text.len() + 3) / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_estimate() {
        let counter = EstimatingTokenCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
        assert_eq!(counter.count("a"), 1);
    }
}
