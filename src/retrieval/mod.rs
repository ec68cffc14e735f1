//! Top-k semantic retrieval over the embedding index.

use crate::embedding::Embedder;
use crate::error::{KapitelError, Result};
use crate::index::{EntryPayload, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One retrieved chapter with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedMatch {
    /// Cosine similarity against the query vector.
    pub score: f32,
    /// The indexed chapter payload.
    #[serde(flatten)]
    pub payload: EntryPayload,
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// The `k` highest-similarity entries for a query vector, ranked.
///
/// Ties keep insertion order. A `k` past the end of the index returns
/// every entry ranked; an empty index with `k > 0` is an error.
pub fn top_k(index: &VectorIndex, query_vector: &[f32], k: usize) -> Result<Vec<RetrievedMatch>> {
    if index.is_empty() {
        if k > 0 {
            return Err(KapitelError::EmptyIndex);
        }
        return Ok(Vec::new());
    }

    let mut matches: Vec<RetrievedMatch> = index
        .embeddings
        .iter()
        .zip(index.data.iter())
        .map(|(embedding, payload)| RetrievedMatch {
            score: cosine_similarity(query_vector, embedding),
            payload: payload.clone(),
        })
        .collect();

    // Stable sort: equal scores stay in insertion order.
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(k);

    Ok(matches)
}

/// Embeds query text and ranks the index against it.
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Create a retriever over a loaded index.
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Number of entries available to rank.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Return the top `k` chapters for a text query.
    #[instrument(skip(self), fields(k = k))]
    pub async fn search(&self, query_text: &str, k: usize) -> Result<Vec<RetrievedMatch>> {
        let query_vector = self.embedder.embed(query_text).await?;
        let matches = top_k(&self.index, &query_vector, k)?;
        debug!("Ranked {} matches for query", matches.len());
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    fn payload(chapter: &str) -> EntryPayload {
        EntryPayload {
            podcast_title: "pod".to_string(),
            episode_title: "ep".to_string(),
            chapter_title: chapter.to_string(),
            chapter_transcript: "text".to_string(),
            episode_url: "https://example.com".to_string(),
            guest: None,
            start_timestamp: 0,
            end_timestamp: None,
        }
    }

    /// Ten entries fanned between the x and y axes, so scores against the
    /// x axis strictly decrease with the entry number.
    fn fanned_index() -> VectorIndex {
        let mut index = VectorIndex::new();
        for i in 0..10 {
            let angle = (i as f32) * 0.1;
            index.push(
                vec![angle.cos(), angle.sin()],
                payload(&format!("ch{}", i)),
            );
        }
        index
    }

    #[test]
    fn test_top_k_returns_k_ranked() {
        let index = fanned_index();
        let matches = top_k(&index, &[1.0, 0.0], 4).unwrap();

        assert_eq!(matches.len(), 4);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(matches[0].payload.chapter_title, "ch0");
    }

    #[test]
    fn test_top_k_clamps_to_index_len() {
        let index = fanned_index();
        let matches = top_k(&index, &[1.0, 0.0], 20).unwrap();
        assert_eq!(matches.len(), 10);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_top_k_ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index.push(vec![1.0, 0.0], payload("first"));
        index.push(vec![1.0, 0.0], payload("second"));
        index.push(vec![0.0, 1.0], payload("third"));

        let matches = top_k(&index, &[1.0, 0.0], 3).unwrap();
        assert_eq!(matches[0].payload.chapter_title, "first");
        assert_eq!(matches[1].payload.chapter_title, "second");
        assert_eq!(matches[2].payload.chapter_title, "third");
    }

    #[test]
    fn test_top_k_empty_index() {
        let index = VectorIndex::new();
        assert!(matches!(
            top_k(&index, &[1.0], 1),
            Err(KapitelError::EmptyIndex)
        ));
        assert!(top_k(&index, &[1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_match_serializes_flat() {
        let m = RetrievedMatch {
            score: 0.5,
            payload: payload("Intro"),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["score"], 0.5);
        assert_eq!(json["chapter_title"], "Intro");
        assert_eq!(json["podcast_title"], "pod");
    }
}
