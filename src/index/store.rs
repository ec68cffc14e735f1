//! Index document persistence.
//!
//! The whole document is read at the start of an indexing run and
//! rewritten at the end. Writes go through a temp file in the same
//! directory and a rename, so a crashed run can never leave a torn
//! document behind. One writer per run; the store does no locking.

use super::VectorIndex;
use crate::error::{KapitelError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// File-backed store for the index document.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Create a store for the document at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Path of the index document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index document, or an empty index if none exists yet.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<VectorIndex> {
        if !self.path.exists() {
            debug!("No index document at {:?}, starting empty", self.path);
            return Ok(VectorIndex::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let index: VectorIndex = serde_json::from_str(&contents)?;
        index.validate()?;

        debug!("Loaded {} index entries from {:?}", index.len(), self.path);
        Ok(index)
    }

    /// Atomically replace the index document.
    #[instrument(skip_all)]
    pub fn save(&self, index: &VectorIndex) -> Result<()> {
        index.validate()?;

        let parent = self.path.parent().ok_or_else(|| {
            KapitelError::Index(format!("Index path {:?} has no parent directory", self.path))
        })?;
        fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer(&temp, index)?;
        temp.persist(&self.path)
            .map_err(|e| KapitelError::Index(format!("Failed to persist index: {}", e)))?;

        info!("Wrote {} index entries to {:?}", index.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EntryPayload;

    fn sample_payload() -> EntryPayload {
        EntryPayload {
            podcast_title: "pod".to_string(),
            episode_title: "ep1".to_string(),
            chapter_title: "Intro".to_string(),
            chapter_transcript: "hello".to_string(),
            episode_url: "https://example.com/ep1".to_string(),
            guest: Some("Jane".to_string()),
            start_timestamp: 0,
            end_timestamp: None,
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(&dir.path().join("index.json"));
        let index = store.load().unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(&dir.path().join("index.json"));

        let mut index = VectorIndex::new();
        index.push(vec![0.1, 0.2], sample_payload());
        store.save(&index).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.data[0].episode_title, "ep1");
        assert_eq!(loaded.embeddings[0], vec![0.1, 0.2]);
    }

    #[test]
    fn test_save_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(&dir.path().join("index.json"));

        let mut index = VectorIndex::new();
        index.push(vec![0.1], sample_payload());
        store.save(&index).unwrap();

        index.push(
            vec![0.2],
            EntryPayload {
                chapter_title: "Outro".to_string(),
                ..sample_payload()
            },
        );
        store.save(&index).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_load_rejects_skewed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, r#"{"embeddings": [[1.0]], "data": []}"#).unwrap();

        assert!(IndexStore::new(&path).load().is_err());
    }
}
