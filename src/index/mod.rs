//! The embedding index: a deduplicated, append-only collection of chapter
//! embeddings and their payloads.
//!
//! The index is one document shared across all podcasts, stored as two
//! parallel arrays (`embeddings[i]` belongs to `data[i]`). Entries are
//! appended, never mutated; a whole indexing run reads the document,
//! extends it, and rewrites it atomically.

mod store;

pub use store::IndexStore;

use crate::embedding::{Embedder, TokenCounter};
use crate::error::{KapitelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Identity of one indexed chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    /// Podcast name.
    pub podcast: String,
    /// Episode title.
    pub episode: String,
    /// Chapter title.
    pub chapter: String,
}

/// Payload stored next to each embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    /// Podcast name.
    pub podcast_title: String,
    /// Episode title.
    pub episode_title: String,
    /// Chapter title.
    pub chapter_title: String,
    /// Rendered chapter transcript.
    pub chapter_transcript: String,
    /// URL of the episode audio or video.
    pub episode_url: String,
    /// Guest on the episode, if any.
    pub guest: Option<String>,
    /// Chapter start in whole seconds.
    pub start_timestamp: u64,
    /// Chapter end in whole seconds; `None` for an episode's final chapter.
    pub end_timestamp: Option<u64>,
}

impl EntryPayload {
    /// The identity key of this payload.
    pub fn key(&self) -> ChapterKey {
        ChapterKey {
            podcast: self.podcast_title.clone(),
            episode: self.episode_title.clone(),
            chapter: self.chapter_title.clone(),
        }
    }

    /// The text that gets embedded: title header plus transcript body.
    pub fn embedding_text(&self) -> String {
        format!(
            "Title: {}\n\nTranscript:\n{}",
            self.chapter_title, self.chapter_transcript
        )
    }
}

/// The persisted index document: two parallel arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Embedding vectors; `embeddings[i]` belongs to `data[i]`.
    pub embeddings: Vec<Vec<f32>>,
    /// Chapter payloads.
    pub data: Vec<EntryPayload>,
}

impl VectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one entry.
    pub fn push(&mut self, embedding: Vec<f32>, payload: EntryPayload) {
        self.embeddings.push(embedding);
        self.data.push(payload);
    }

    /// The set of keys already present.
    pub fn keys(&self) -> HashSet<ChapterKey> {
        self.data.iter().map(|p| p.key()).collect()
    }

    /// Drop entries whose transcript is empty. Legacy documents carried
    /// such rows; nothing downstream can use them.
    pub fn prune_empty(&mut self) {
        let mut kept_embeddings = Vec::with_capacity(self.embeddings.len());
        let mut kept_data = Vec::with_capacity(self.data.len());
        for (embedding, payload) in self.embeddings.drain(..).zip(self.data.drain(..)) {
            if !payload.chapter_transcript.is_empty() {
                kept_embeddings.push(embedding);
                kept_data.push(payload);
            }
        }
        self.embeddings = kept_embeddings;
        self.data = kept_data;
    }

    /// Check the parallel-array invariant.
    pub fn validate(&self) -> Result<()> {
        if self.embeddings.len() != self.data.len() {
            return Err(KapitelError::Index(format!(
                "Parallel arrays out of sync: {} embeddings vs {} payloads",
                self.embeddings.len(),
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// Counters for one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Candidates considered.
    pub considered: usize,
    /// Entries appended.
    pub appended: usize,
    /// Candidates skipped because their key was already indexed.
    pub skipped_duplicate: usize,
    /// Candidates skipped for empty text.
    pub skipped_empty: usize,
    /// Candidates skipped for exceeding the token budget.
    pub skipped_over_budget: usize,
}

impl IndexReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: &IndexReport) {
        self.considered += other.considered;
        self.appended += other.appended;
        self.skipped_duplicate += other.skipped_duplicate;
        self.skipped_empty += other.skipped_empty;
        self.skipped_over_budget += other.skipped_over_budget;
    }
}

/// Extends the index with new chapters, deduplicated by key.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    token_counter: Box<dyn TokenCounter>,
    token_limit: usize,
}

impl IndexBuilder {
    /// Create a builder around an embedder and a token budget.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        token_counter: Box<dyn TokenCounter>,
        token_limit: usize,
    ) -> Self {
        Self {
            embedder,
            token_counter,
            token_limit,
        }
    }

    /// Append every eligible candidate to the index.
    ///
    /// A candidate is skipped when its key already exists, its transcript
    /// is empty, or its embedding text exceeds the token budget. The
    /// operation is a monotonic append: nothing is removed or rewritten,
    /// so re-running over the same corpus produces no new entries.
    pub async fn extend(
        &self,
        mut index: VectorIndex,
        candidates: Vec<EntryPayload>,
    ) -> Result<(VectorIndex, IndexReport)> {
        index.validate()?;

        let mut existing = index.keys();
        let mut report = IndexReport::default();

        for candidate in candidates {
            report.considered += 1;

            let key = candidate.key();
            if existing.contains(&key) {
                report.skipped_duplicate += 1;
                continue;
            }

            if candidate.chapter_transcript.is_empty() {
                report.skipped_empty += 1;
                continue;
            }

            let text = candidate.embedding_text();
            let tokens = self.token_counter.count(&text);
            if tokens > self.token_limit {
                debug!(
                    "'{}' over token budget ({} > {})",
                    candidate.chapter_title, tokens, self.token_limit
                );
                report.skipped_over_budget += 1;
                continue;
            }

            let embedding = self.embedder.embed(&text).await?;
            index.push(embedding, candidate);
            existing.insert(key);
            report.appended += 1;
        }

        Ok((index, report))
    }
}
