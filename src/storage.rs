//! Data-directory layout and JSON persistence.
//!
//! Everything lives under one root:
//!
//! ```text
//! <data_dir>/
//!   index.json                                  the embedding index document
//!   podcasts/<name>/transcripts/<episode>.json  diarized word lists (input)
//!   podcasts/<name>/metadata/<episode>.json     guest, url, chapter markers (input)
//!   podcasts/<name>/chapters/<episode>.json     chapter title -> text (output)
//! ```
//!
//! Transcripts and metadata are written by the acquisition pipeline;
//! chapter maps are this crate's per-episode output.

use crate::error::Result;
use crate::transcript::{EpisodeMetadata, EpisodeTranscript};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_FILE: &str = "index.json";
const PODCASTS_DIR: &str = "podcasts";
const TRANSCRIPTS_DIR: &str = "transcripts";
const METADATA_DIR: &str = "metadata";
const CHAPTERS_DIR: &str = "chapters";

/// File-backed storage rooted at the configured data directory.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Create storage rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Path of the index document.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn podcast_dir(&self, podcast: &str, kind: &str) -> PathBuf {
        self.root.join(PODCASTS_DIR).join(podcast).join(kind)
    }

    fn episode_file(&self, podcast: &str, kind: &str, episode: &str) -> PathBuf {
        self.podcast_dir(podcast, kind).join(format!("{}.json", episode))
    }

    /// Episode names (file stems) with a transcript on disk, sorted.
    pub fn list_transcribed(&self, podcast: &str) -> Result<Vec<String>> {
        self.list_stems(&self.podcast_dir(podcast, TRANSCRIPTS_DIR))
    }

    /// Episode names with a chapter map on disk, sorted.
    pub fn list_chapterized(&self, podcast: &str) -> Result<Vec<String>> {
        self.list_stems(&self.podcast_dir(podcast, CHAPTERS_DIR))
    }

    fn list_stems(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut stems = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_string());
                }
            }
        }
        stems.sort();
        Ok(stems)
    }

    /// Load an episode's diarized transcript.
    pub fn load_transcript(&self, podcast: &str, episode: &str) -> Result<EpisodeTranscript> {
        self.read_json(&self.episode_file(podcast, TRANSCRIPTS_DIR, episode))
    }

    /// Load an episode's metadata, or `None` when the acquisition pipeline
    /// has not written it yet.
    pub fn load_metadata(&self, podcast: &str, episode: &str) -> Result<Option<EpisodeMetadata>> {
        let path = self.episode_file(podcast, METADATA_DIR, episode);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(self.read_json(&path)?))
    }

    /// Whether an episode already has a chapter map.
    pub fn has_chapters(&self, podcast: &str, episode: &str) -> bool {
        self.episode_file(podcast, CHAPTERS_DIR, episode).exists()
    }

    /// Persist an episode's chapter map.
    pub fn save_chapters(
        &self,
        podcast: &str,
        episode: &str,
        chapters: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.write_json(&self.episode_file(podcast, CHAPTERS_DIR, episode), chapters)
    }

    /// Load an episode's chapter map.
    pub fn load_chapters(&self, podcast: &str, episode: &str) -> Result<BTreeMap<String, String>> {
        self.read_json(&self.episode_file(podcast, CHAPTERS_DIR, episode))
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(value)?)?;
        debug!("Wrote {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{ChapterMarker, Word};

    #[test]
    fn test_chapter_map_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let mut chapters = BTreeMap::new();
        chapters.insert("Intro".to_string(), "Welcome everyone.".to_string());
        storage.save_chapters("pod", "ep1", &chapters).unwrap();

        assert!(storage.has_chapters("pod", "ep1"));
        assert!(!storage.has_chapters("pod", "ep2"));
        assert_eq!(storage.load_chapters("pod", "ep1").unwrap(), chapters);
        assert_eq!(storage.list_chapterized("pod").unwrap(), vec!["ep1"]);
    }

    #[test]
    fn test_transcript_and_metadata_loading() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let transcript_dir = dir.path().join("podcasts/pod/transcripts");
        fs::create_dir_all(&transcript_dir).unwrap();
        let transcript = EpisodeTranscript::new(vec![Word::new("hi.", 0, 400, "A")]);
        fs::write(
            transcript_dir.join("ep1.json"),
            serde_json::to_string(&transcript).unwrap(),
        )
        .unwrap();

        let metadata_dir = dir.path().join("podcasts/pod/metadata");
        fs::create_dir_all(&metadata_dir).unwrap();
        let metadata = EpisodeMetadata {
            guest: None,
            url: "https://example.com/ep1".to_string(),
            chapters: vec![ChapterMarker::new("0", "All")],
            published_at: None,
        };
        fs::write(
            metadata_dir.join("ep1.json"),
            serde_json::to_string(&metadata).unwrap(),
        )
        .unwrap();

        assert_eq!(storage.list_transcribed("pod").unwrap(), vec!["ep1"]);
        assert_eq!(storage.load_transcript("pod", "ep1").unwrap().words.len(), 1);
        assert!(storage.load_metadata("pod", "ep1").unwrap().is_some());
        assert!(storage.load_metadata("pod", "ep2").unwrap().is_none());
    }

    #[test]
    fn test_missing_podcast_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        assert!(storage.list_transcribed("nope").unwrap().is_empty());
    }
}
