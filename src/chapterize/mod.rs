//! Transcript chapterization.
//!
//! Turns a diarized word sequence plus externally supplied chapter markers
//! into rendered chapters: boundary detection picks the legal cut points,
//! the splitter resolves markers to boundaries and renders the text.

mod boundary;
mod splitter;

pub use boundary::{count_speakers, detect_boundaries, Boundary};
pub use splitter::{split_into_chapters, Chapter, SplitOutcome};

use crate::error::Result;
use crate::transcript::{EpisodeMetadata, EpisodeTranscript};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Resolves diarized speaker ids to display names.
///
/// Speaker naming is a property of the podcast, not of the splitting
/// algorithm, so it is injected at the seam.
pub trait SpeakerLabeler: Send + Sync {
    /// Display name for a speaker id.
    fn label(&self, speaker: &str) -> String;
}

/// Labeler for the common host/guest show format.
///
/// The diarizer tags the first (dominant) speaker as `"A"`; that id maps to
/// the host and every other id to the guest.
pub struct HostGuestLabeler {
    host: String,
    guest: Option<String>,
}

impl HostGuestLabeler {
    /// Create a labeler for an episode.
    pub fn new(host: &str, guest: Option<&str>) -> Self {
        Self {
            host: host.to_string(),
            guest: guest.map(|g| g.to_string()),
        }
    }
}

impl SpeakerLabeler for HostGuestLabeler {
    fn label(&self, speaker: &str) -> String {
        if speaker == "A" {
            self.host.clone()
        } else {
            self.guest.clone().unwrap_or_else(|| "Guest".to_string())
        }
    }
}

/// Chapterization result for one episode.
#[derive(Debug, Clone)]
pub struct ChapterizedEpisode {
    /// Rendered chapters in marker order.
    pub chapters: Vec<Chapter>,
    /// Markers dropped for malformed timestamps.
    pub skipped_markers: usize,
}

impl ChapterizedEpisode {
    /// The persisted form: chapter title -> rendered text.
    pub fn chapter_map(&self) -> BTreeMap<String, String> {
        self.chapters
            .iter()
            .map(|c| (c.title.clone(), c.text.clone()))
            .collect()
    }
}

/// Splits one podcast's transcripts into chapters.
pub struct Chapterizer {
    host: String,
}

impl Chapterizer {
    /// Create a chapterizer for a podcast with the given host.
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
        }
    }

    /// Chapterize a single episode transcript.
    #[instrument(skip_all, fields(markers = metadata.chapters.len()))]
    pub fn chapterize(
        &self,
        transcript: &EpisodeTranscript,
        metadata: &EpisodeMetadata,
    ) -> Result<ChapterizedEpisode> {
        let boundaries = detect_boundaries(&transcript.words)?;
        debug!("Detected {} boundaries", boundaries.len());

        let labeler = HostGuestLabeler::new(&self.host, metadata.guest.as_deref());
        let outcome = split_into_chapters(
            &transcript.words,
            &boundaries,
            &metadata.chapters,
            &labeler,
        );

        Ok(ChapterizedEpisode {
            chapters: outcome.chapters,
            skipped_markers: outcome.skipped_markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{ChapterMarker, Word};

    #[test]
    fn test_host_guest_labeler() {
        let labeler = HostGuestLabeler::new("Dr. Host", Some("Dr. Guest"));
        assert_eq!(labeler.label("A"), "Dr. Host");
        assert_eq!(labeler.label("B"), "Dr. Guest");
        assert_eq!(labeler.label("C"), "Dr. Guest");

        let no_guest = HostGuestLabeler::new("Dr. Host", None);
        assert_eq!(no_guest.label("B"), "Guest");
    }

    #[test]
    fn test_chapterize_end_to_end() {
        let transcript = EpisodeTranscript::new(vec![
            Word::new("Welcome.", 0, 1_000, "A"),
            Word::new("Thanks", 1_000, 2_000, "B"),
            Word::new("for", 2_000, 2_200, "B"),
            Word::new("having", 2_200, 2_500, "B"),
            Word::new("me.", 2_500, 3_000, "B"),
        ]);
        let metadata = EpisodeMetadata {
            guest: Some("Jane Doe".to_string()),
            url: "https://example.com/ep1".to_string(),
            chapters: vec![ChapterMarker::new("00:00:00", "Greetings")],
            published_at: None,
        };

        let result = Chapterizer::new("John Host")
            .chapterize(&transcript, &metadata)
            .unwrap();

        assert_eq!(result.chapters.len(), 1);
        assert_eq!(result.skipped_markers, 0);
        assert_eq!(
            result.chapters[0].text,
            "John Host:\nWelcome.\n\nJane Doe:\nThanks for having me."
        );

        let map = result.chapter_map();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("Greetings"));
    }

    #[test]
    fn test_empty_transcript_is_fatal() {
        let metadata = EpisodeMetadata {
            guest: None,
            url: "https://example.com/ep2".to_string(),
            chapters: vec![ChapterMarker::new("0", "All")],
            published_at: None,
        };
        let result =
            Chapterizer::new("Host").chapterize(&EpisodeTranscript::new(Vec::new()), &metadata);
        assert!(result.is_err());
    }
}
