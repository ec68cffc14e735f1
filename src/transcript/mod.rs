//! Data models for diarized transcripts and episode metadata.
//!
//! Transcripts arrive from the speech-to-text collaborator as a word list
//! with per-word timing and speaker tags. Episode metadata (guest, source
//! URL, chapter markers) is written next to each transcript by the audio
//! acquisition pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single transcribed word with timing and speaker attribution.
///
/// The wire format uses `start`/`end` keys; both are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    /// The word text, including any trailing punctuation.
    pub text: String,
    /// Start time in milliseconds.
    #[serde(rename = "start")]
    pub start_ms: u64,
    /// End time in milliseconds.
    #[serde(rename = "end")]
    pub end_ms: u64,
    /// Diarized speaker id ("A", "B", ...).
    pub speaker: String,
}

impl Word {
    /// Create a new word.
    pub fn new(text: &str, start_ms: u64, end_ms: u64, speaker: &str) -> Self {
        Self {
            text: text.to_string(),
            start_ms,
            end_ms,
            speaker: speaker.to_string(),
        }
    }
}

/// A complete diarized transcript for one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeTranscript {
    /// All words in time order.
    pub words: Vec<Word>,
}

impl EpisodeTranscript {
    /// Create a new transcript from a word list.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Total duration in milliseconds (end of the last word).
    pub fn duration_ms(&self) -> u64 {
        self.words.last().map(|w| w.end_ms).unwrap_or(0)
    }
}

/// An externally supplied chapter marker: an approximate start timestamp
/// plus the chapter title. Serialized as a `[timestamp, title]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ChapterMarker {
    /// Start timestamp string (`hh:mm:ss`, possibly truncated).
    pub start_timestamp: String,
    /// Chapter title, unique within one episode's marker list.
    pub title: String,
}

impl ChapterMarker {
    /// Create a new chapter marker.
    pub fn new(start_timestamp: &str, title: &str) -> Self {
        Self {
            start_timestamp: start_timestamp.to_string(),
            title: title.to_string(),
        }
    }
}

impl From<(String, String)> for ChapterMarker {
    fn from((start_timestamp, title): (String, String)) -> Self {
        Self {
            start_timestamp,
            title,
        }
    }
}

impl From<ChapterMarker> for (String, String) {
    fn from(marker: ChapterMarker) -> Self {
        (marker.start_timestamp, marker.title)
    }
}

/// Metadata stored alongside each episode's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    /// Guest on this episode, if any.
    pub guest: Option<String>,
    /// URL of the episode audio or video.
    pub url: String,
    /// Chapter markers extracted from the episode description.
    pub chapters: Vec<ChapterMarker>,
    /// Publication date, when the feed provides one.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_wire_format() {
        let json = r#"{"text": "hello.", "start": 100, "end": 450, "speaker": "A"}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.text, "hello.");
        assert_eq!(word.start_ms, 100);
        assert_eq!(word.end_ms, 450);
        assert_eq!(word.speaker, "A");
    }

    #[test]
    fn test_marker_pair_format() {
        let json = r#"[["00:00:00", "Introduction"], ["00:02:40", "Sponsors"]]"#;
        let markers: Vec<ChapterMarker> = serde_json::from_str(json).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].title, "Introduction");
        assert_eq!(markers[1].start_timestamp, "00:02:40");

        let round_tripped = serde_json::to_string(&markers).unwrap();
        assert_eq!(
            round_tripped,
            r#"[["00:00:00","Introduction"],["00:02:40","Sponsors"]]"#
        );
    }

    #[test]
    fn test_transcript_duration() {
        let transcript = EpisodeTranscript::new(vec![
            Word::new("we", 0, 500, "A"),
            Word::new("discuss.", 500, 1000, "A"),
        ]);
        assert_eq!(transcript.duration_ms(), 1000);
    }
}
