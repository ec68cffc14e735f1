//! Pipeline coordination for Kapitel.
//!
//! Two runs make up the pipeline: chapterization (transcripts + metadata
//! in, chapter maps out, one episode at a time) and indexing (read the
//! index document, append every eligible chapter, rewrite atomically).
//! Indexing assumes a single writer per run.

use crate::chapterize::Chapterizer;
use crate::config::Settings;
use crate::embedding::{Embedder, EstimatingTokenCounter, OpenAIEmbedder};
use crate::error::{KapitelError, Result};
use crate::feed::Podcast;
use crate::index::{EntryPayload, IndexBuilder, IndexReport, IndexStore};
use crate::retrieval::Retriever;
use crate::storage::Storage;
use crate::timestamp::parse_timestamp;
use crate::transcript::ChapterMarker;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main coordinator for the Kapitel pipeline.
pub struct Pipeline {
    settings: Settings,
    storage: Storage,
    embedder: Arc<dyn Embedder>,
}

impl Pipeline {
    /// Create a pipeline with default collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        Self::with_components(settings, embedder)
    }

    /// Create a pipeline with a custom embedder.
    pub fn with_components(settings: Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let data_dir = settings.data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let storage = Storage::new(&data_dir);

        Ok(Self {
            settings,
            storage,
            embedder,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Chapterize every pending episode of one podcast.
    ///
    /// An episode is pending when it has a transcript and metadata but no
    /// chapter map yet. An empty transcript is fatal to that episode only.
    #[instrument(skip(self), fields(podcast = %podcast.name))]
    pub fn chapterize_podcast(&self, podcast: &Podcast) -> Result<ChapterizeSummary> {
        info!("Running chapterization for {}", podcast.name);

        let chapterizer = Chapterizer::new(&podcast.host);
        let mut summary = ChapterizeSummary::default();

        for episode in self.storage.list_transcribed(&podcast.name)? {
            if self.storage.has_chapters(&podcast.name, &episode) {
                summary.already_chapterized += 1;
                continue;
            }

            let Some(metadata) = self.storage.load_metadata(&podcast.name, &episode)? else {
                summary.missing_metadata += 1;
                continue;
            };

            let transcript = self.storage.load_transcript(&podcast.name, &episode)?;
            match chapterizer.chapterize(&transcript, &metadata) {
                Ok(result) => {
                    summary.markers_skipped += result.skipped_markers;
                    self.storage
                        .save_chapters(&podcast.name, &episode, &result.chapter_map())?;
                    summary.chapterized += 1;
                    info!("Chapterized: {}", episode);
                }
                Err(KapitelError::EmptyTranscript(reason)) => {
                    warn!("Cannot chapterize '{}': {}", episode, reason);
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    /// Chapterize every registered podcast.
    pub fn chapterize_all(&self) -> Result<ChapterizeSummary> {
        let mut total = ChapterizeSummary::default();
        for podcast in &self.settings.podcasts {
            let summary = self.chapterize_podcast(podcast)?;
            total.merge(&summary);
        }
        Ok(total)
    }

    /// Run one indexing pass over every chapterized episode.
    ///
    /// Reads the index document once, appends every eligible chapter of
    /// every podcast, and rewrites the document atomically at the end.
    #[instrument(skip(self))]
    pub async fn update_index(&self) -> Result<IndexReport> {
        let store = IndexStore::new(&self.storage.index_path());
        let mut index = store.load()?;
        index.prune_empty();

        let builder = IndexBuilder::new(
            self.embedder.clone(),
            Box::new(EstimatingTokenCounter),
            self.settings.index.token_limit,
        );

        let mut report = IndexReport::default();
        for podcast in &self.settings.podcasts {
            let episodes = self.storage.list_chapterized(&podcast.name)?;
            if episodes.is_empty() {
                continue;
            }

            info!("Generating embeddings for {}", podcast.name);
            let progress = episode_progress_bar(episodes.len() as u64, &podcast.name);

            for episode in episodes {
                let candidates = self.episode_candidates(podcast, &episode)?;
                let (extended, episode_report) = builder.extend(index, candidates).await?;
                index = extended;
                report.merge(&episode_report);
                progress.inc(1);
            }

            progress.finish_and_clear();
        }

        store.save(&index)?;

        info!(
            "{} chapters exceeded the token limit out of {}",
            report.skipped_over_budget, report.considered
        );
        Ok(report)
    }

    /// Build index candidates for one chapterized episode.
    fn episode_candidates(&self, podcast: &Podcast, episode: &str) -> Result<Vec<EntryPayload>> {
        let Some(metadata) = self.storage.load_metadata(&podcast.name, episode)? else {
            warn!("No metadata for chapterized episode '{}'", episode);
            return Ok(Vec::new());
        };

        let chapters = self.storage.load_chapters(&podcast.name, episode)?;
        let timestamps = marker_timestamps(&metadata.chapters);

        let mut candidates = Vec::with_capacity(chapters.len());
        for (title, text) in chapters {
            let Some((start_timestamp, end_timestamp)) = timestamps.get(&title).copied() else {
                warn!("Chapter '{}' has no marker timestamp, skipping", title);
                continue;
            };

            candidates.push(EntryPayload {
                podcast_title: podcast.name.clone(),
                episode_title: episode.to_string(),
                chapter_title: title,
                chapter_transcript: text,
                episode_url: metadata.url.clone(),
                guest: metadata.guest.clone(),
                start_timestamp,
                end_timestamp,
            });
        }

        Ok(candidates)
    }

    /// Open a retriever over the current index document.
    pub fn open_retriever(&self) -> Result<Retriever> {
        let index = IndexStore::new(&self.storage.index_path()).load()?;
        Ok(Retriever::new(index, self.embedder.clone()))
    }
}

/// Per-chapter `(start, end)` second stamps derived from the marker list.
/// The end of each chapter is the next parseable marker's start; the final
/// chapter has no end.
fn marker_timestamps(markers: &[ChapterMarker]) -> BTreeMap<String, (u64, Option<u64>)> {
    let decoded: Vec<(&ChapterMarker, u64)> = markers
        .iter()
        .filter_map(|m| match parse_timestamp(&m.start_timestamp) {
            Ok(ms) => Some((m, ms / 1000)),
            Err(e) => {
                warn!("Skipping marker '{}': {}", m.title, e);
                None
            }
        })
        .collect();

    let mut timestamps = BTreeMap::new();
    for (index, (marker, seconds)) in decoded.iter().enumerate() {
        let end = decoded.get(index + 1).map(|(_, next)| *next);
        timestamps.insert(marker.title.clone(), (*seconds, end));
    }
    timestamps
}

fn episode_progress_bar(len: u64, podcast: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(podcast.to_string());
    pb
}

/// Counters for one chapterization run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterizeSummary {
    /// Episodes chapterized in this run.
    pub chapterized: usize,
    /// Episodes that already had a chapter map.
    pub already_chapterized: usize,
    /// Episodes skipped because metadata is missing.
    pub missing_metadata: usize,
    /// Episodes whose transcript could not be chapterized.
    pub failed: usize,
    /// Markers dropped for malformed timestamps, across all episodes.
    pub markers_skipped: usize,
}

impl ChapterizeSummary {
    /// Fold another summary into this one.
    pub fn merge(&mut self, other: &ChapterizeSummary) {
        self.chapterized += other.chapterized;
        self.already_chapterized += other.already_chapterized;
        self.missing_metadata += other.missing_metadata;
        self.failed += other.failed;
        self.markers_skipped += other.markers_skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::feed::{FeedConfig, MarkerStyle};
    use crate::transcript::{EpisodeMetadata, EpisodeTranscript, Word};
    use async_trait::async_trait;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn test_podcast() -> Podcast {
        Podcast {
            name: "testpod".to_string(),
            title: "Test Podcast".to_string(),
            host: "Host".to_string(),
            feed: FeedConfig::Youtube {
                channel_id: "UCtest".to_string(),
            },
            marker_style: MarkerStyle::TimestampLines,
        }
    }

    fn test_settings(data_dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = data_dir.to_string_lossy().to_string();
        settings.podcasts = vec![test_podcast()];
        settings
    }

    fn write_episode(data_dir: &std::path::Path, episode: &str) {
        let transcript = EpisodeTranscript::new(vec![
            Word::new("Welcome.", 0, 1_000, "A"),
            Word::new("First", 1_000, 61_000, "A"),
            Word::new("topic.", 61_000, 62_000, "A"),
        ]);
        let metadata = EpisodeMetadata {
            guest: None,
            url: format!("https://example.com/{}", episode),
            chapters: vec![
                ChapterMarker::new("00:00:00", "Intro"),
                ChapterMarker::new("00:00:01", "Topic"),
            ],
            published_at: None,
        };

        let transcripts = data_dir.join("podcasts/testpod/transcripts");
        let metadata_dir = data_dir.join("podcasts/testpod/metadata");
        std::fs::create_dir_all(&transcripts).unwrap();
        std::fs::create_dir_all(&metadata_dir).unwrap();
        std::fs::write(
            transcripts.join(format!("{}.json", episode)),
            serde_json::to_string(&transcript).unwrap(),
        )
        .unwrap();
        std::fs::write(
            metadata_dir.join(format!("{}.json", episode)),
            serde_json::to_string(&metadata).unwrap(),
        )
        .unwrap();
    }

    fn test_pipeline(data_dir: &std::path::Path) -> Pipeline {
        Pipeline::with_components(test_settings(data_dir), Arc::new(StubEmbedder)).unwrap()
    }

    #[tokio::test]
    async fn test_chapterize_then_index() {
        let dir = tempfile::tempdir().unwrap();
        write_episode(dir.path(), "ep1");
        let pipeline = test_pipeline(dir.path());

        let summary = pipeline.chapterize_all().unwrap();
        assert_eq!(summary.chapterized, 1);
        assert_eq!(summary.failed, 0);

        // A second run finds the chapter map in place.
        let summary = pipeline.chapterize_all().unwrap();
        assert_eq!(summary.chapterized, 0);
        assert_eq!(summary.already_chapterized, 1);

        let report = pipeline.update_index().await.unwrap();
        assert_eq!(report.appended, 2);

        // Indexing again appends nothing.
        let report = pipeline.update_index().await.unwrap();
        assert_eq!(report.appended, 0);
        assert_eq!(report.skipped_duplicate, 2);

        let retriever = pipeline.open_retriever().unwrap();
        assert_eq!(retriever.index_len(), 2);
    }

    #[tokio::test]
    async fn test_index_payload_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_episode(dir.path(), "ep1");
        let pipeline = test_pipeline(dir.path());

        pipeline.chapterize_all().unwrap();
        pipeline.update_index().await.unwrap();

        let index = IndexStore::new(&dir.path().join("index.json")).load().unwrap();
        let intro = index
            .data
            .iter()
            .find(|p| p.chapter_title == "Intro")
            .unwrap();
        assert_eq!(intro.podcast_title, "testpod");
        assert_eq!(intro.episode_title, "ep1");
        assert_eq!(intro.episode_url, "https://example.com/ep1");
        assert_eq!(intro.start_timestamp, 0);
        assert_eq!(intro.end_timestamp, Some(1));

        let topic = index
            .data
            .iter()
            .find(|p| p.chapter_title == "Topic")
            .unwrap();
        assert_eq!(topic.end_timestamp, None);
    }

    #[test]
    fn test_marker_timestamps() {
        let markers = vec![
            ChapterMarker::new("00:00:00", "Intro"),
            ChapterMarker::new("bogus", "Broken"),
            ChapterMarker::new("00:02:05", "Topic"),
        ];
        let timestamps = marker_timestamps(&markers);

        assert_eq!(timestamps.get("Intro"), Some(&(0, Some(125))));
        assert_eq!(timestamps.get("Topic"), Some(&(125, None)));
        assert!(!timestamps.contains_key("Broken"));
    }

    #[test]
    fn test_missing_metadata_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_episode(dir.path(), "ep1");
        // ep2 has a transcript but no metadata.
        let transcripts = dir.path().join("podcasts/testpod/transcripts");
        std::fs::write(
            transcripts.join("ep2.json"),
            serde_json::to_string(&EpisodeTranscript::new(vec![
                Word::new("a.", 0, 100, "A"),
                Word::new("b", 100, 200, "A"),
            ]))
            .unwrap(),
        )
        .unwrap();

        let pipeline = test_pipeline(dir.path());
        let summary = pipeline.chapterize_all().unwrap();
        assert_eq!(summary.chapterized, 1);
        assert_eq!(summary.missing_metadata, 1);
    }
}
