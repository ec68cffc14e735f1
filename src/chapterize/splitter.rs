//! Chapter-range assignment and text rendering.
//!
//! Resolves each externally supplied chapter marker to an exact boundary,
//! slices the word sequence into chapter ranges, and renders each range
//! into display text with speaker attribution.

use super::boundary::{count_speakers, Boundary};
use super::SpeakerLabeler;
use crate::timestamp::parse_timestamp;
use crate::transcript::{ChapterMarker, Word};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A rendered chapter, ready to be persisted and indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title from the marker.
    pub title: String,
    /// Rendered transcript text with speaker attribution.
    pub text: String,
    /// Marker start timestamp in whole seconds.
    pub start_seconds: u64,
    /// Next marker's start timestamp in whole seconds; `None` for the
    /// final chapter of an episode.
    pub end_seconds: Option<u64>,
}

/// Result of splitting one transcript.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Chapters in marker order.
    pub chapters: Vec<Chapter>,
    /// Markers dropped because their timestamp did not parse.
    pub skipped_markers: usize,
}

/// Split a word sequence into chapters at the given boundaries.
///
/// Markers resolve front to back with a monotonic cursor, so boundary
/// resolution never re-scans earlier boundaries. A marker whose timestamp
/// fails to parse loses only its own chapter. An empty marker list yields
/// an empty chapter list.
pub fn split_into_chapters(
    words: &[Word],
    boundaries: &[Boundary],
    markers: &[ChapterMarker],
    labeler: &dyn SpeakerLabeler,
) -> SplitOutcome {
    let multi_speaker = count_speakers(words) > 1;

    let mut decoded: Vec<(u64, &ChapterMarker)> = Vec::with_capacity(markers.len());
    let mut skipped_markers = 0;
    for marker in markers {
        match parse_timestamp(&marker.start_timestamp) {
            Ok(start_ms) => decoded.push((start_ms, marker)),
            Err(e) => {
                warn!("Skipping chapter '{}': {}", marker.title, e);
                skipped_markers += 1;
            }
        }
    }

    let mut chapters = Vec::with_capacity(decoded.len());
    let mut cursor = 0;
    for (index, (start_ms, marker)) in decoded.iter().enumerate() {
        let start_boundary = resolve_boundary(boundaries, *start_ms, cursor);
        let start_word = boundaries[start_boundary].word_index;

        // Non-final chapters end at the boundary resolved for the next
        // marker; that boundary doubles as the next chapter's start, so the
        // ranges partition the word sequence. The final chapter runs to the
        // end of the word list, trailing unmarked words included.
        let (end_boundary, end_word, end_seconds) = if index + 1 < decoded.len() {
            let (next_ms, _) = decoded[index + 1];
            let resolved = resolve_boundary(boundaries, next_ms, start_boundary);
            (resolved, boundaries[resolved].word_index, Some(next_ms / 1000))
        } else {
            (boundaries.len() - 1, words.len(), None)
        };

        chapters.push(Chapter {
            title: marker.title.clone(),
            text: render_chapter_text(words, start_word, end_word, multi_speaker, labeler),
            start_seconds: start_ms / 1000,
            end_seconds,
        });

        cursor = end_boundary;
    }

    SplitOutcome {
        chapters,
        skipped_markers,
    }
}

/// Index of the rightmost boundary at or before `timestamp_ms`, looking
/// only at `cursor` and later. Exact timestamp hits resolve to that
/// boundary (inclusive starts). Falls back to `cursor` when every
/// remaining boundary lies past the timestamp.
fn resolve_boundary(boundaries: &[Boundary], timestamp_ms: u64, cursor: usize) -> usize {
    let within = boundaries[cursor..].partition_point(|b| b.timestamp_ms <= timestamp_ms);
    if within == 0 {
        cursor
    } else {
        cursor + within - 1
    }
}

/// Render the words in `[start_word, end_word)` as chapter text.
///
/// In multi-speaker transcripts every speaker change (and the first word)
/// gets a labeled break; single-speaker transcripts render plain text.
fn render_chapter_text(
    words: &[Word],
    start_word: usize,
    end_word: usize,
    multi_speaker: bool,
    labeler: &dyn SpeakerLabeler,
) -> String {
    let mut text = String::new();
    let mut previous_speaker: Option<&str> = None;

    for word in &words[start_word..end_word] {
        if multi_speaker && previous_speaker != Some(word.speaker.as_str()) {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
            text.push_str("\n\n");
            text.push_str(&labeler.label(&word.speaker));
            text.push_str(":\n");
        }

        text.push_str(&word.text);
        text.push(' ');
        previous_speaker = Some(word.speaker.as_str());
    }

    text.trim().to_string()
}
