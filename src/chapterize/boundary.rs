//! Boundary detection over diarized word sequences.
//!
//! A boundary is a transcript position at which a chapter cut is permitted.
//! Single-speaker transcripts break at sentence ends; multi-speaker
//! transcripts break at speaker changes.

use crate::error::{KapitelError, Result};
use crate::transcript::Word;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Characters that terminate a sentence.
const SENTENCE_END_PUNCTUATION: &[char] = &['.', '?', '!'];

/// A point at which the transcript may be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    /// Timestamp of the cut in milliseconds.
    pub timestamp_ms: u64,
    /// Index of the first word after the cut.
    pub word_index: usize,
}

/// Count distinct speaker ids across a word sequence.
pub fn count_speakers(words: &[Word]) -> usize {
    let speakers: HashSet<&str> = words.iter().map(|w| w.speaker.as_str()).collect();
    speakers.len()
}

/// Detect the ordered set of legal cut points for a transcript.
///
/// The result always starts with the `{0, 0}` boundary and is strictly
/// increasing in word index. Transcripts with fewer than two words carry
/// nothing to split and are rejected.
pub fn detect_boundaries(words: &[Word]) -> Result<Vec<Boundary>> {
    if words.len() < 2 {
        return Err(KapitelError::EmptyTranscript(format!(
            "{} word(s) is not enough to chapterize",
            words.len()
        )));
    }

    if count_speakers(words) == 1 {
        Ok(sentence_boundaries(words))
    } else {
        Ok(speaker_change_boundaries(words))
    }
}

/// Emit a boundary after every sentence-ending word.
///
/// The boundary's word index points at the word following the sentence end;
/// a sentence end on the final word therefore emits nothing.
fn sentence_boundaries(words: &[Word]) -> Vec<Boundary> {
    let mut boundaries = vec![Boundary {
        timestamp_ms: 0,
        word_index: 0,
    }];

    for index in 1..words.len() {
        let previous = &words[index - 1];
        if previous.text.ends_with(SENTENCE_END_PUNCTUATION) {
            boundaries.push(Boundary {
                timestamp_ms: previous.end_ms,
                word_index: index,
            });
        }
    }

    boundaries
}

/// Emit a boundary at the first word of every new speaker run.
fn speaker_change_boundaries(words: &[Word]) -> Vec<Boundary> {
    let mut boundaries = vec![Boundary {
        timestamp_ms: 0,
        word_index: 0,
    }];

    let mut current_speaker = words[0].speaker.as_str();
    for (index, word) in words.iter().enumerate() {
        if word.speaker != current_speaker {
            // The timestamp is the incoming speaker's first word end, not
            // the outgoing speaker's. Existing index documents were built
            // against this stamping, so it stays.
            boundaries.push(Boundary {
                timestamp_ms: word.end_ms,
                word_index: index,
            });
        }
        current_speaker = word.speaker.as_str();
    }

    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_speaker_words() -> Vec<Word> {
        vec![
            Word::new("we", 0, 500, "A"),
            Word::new("discuss.", 500, 1000, "A"),
            Word::new("hello", 1000, 1500, "A"),
        ]
    }

    #[test]
    fn test_sentence_boundaries() {
        let boundaries = detect_boundaries(&single_speaker_words()).unwrap();
        assert_eq!(
            boundaries,
            vec![
                Boundary {
                    timestamp_ms: 0,
                    word_index: 0
                },
                Boundary {
                    timestamp_ms: 1000,
                    word_index: 2
                },
            ]
        );
    }

    #[test]
    fn test_sentence_end_on_final_word_emits_nothing() {
        let words = vec![
            Word::new("Hi.", 0, 400, "A"),
            Word::new("Bye.", 400, 900, "A"),
        ];
        let boundaries = detect_boundaries(&words).unwrap();
        // Only the sentence end after "Hi." has a following word.
        assert_eq!(
            boundaries,
            vec![
                Boundary {
                    timestamp_ms: 0,
                    word_index: 0
                },
                Boundary {
                    timestamp_ms: 400,
                    word_index: 1
                },
            ]
        );
    }

    #[test]
    fn test_speaker_change_boundaries() {
        let words = vec![
            Word::new("we", 0, 500, "A"),
            Word::new("discuss.", 500, 1000, "A"),
            Word::new("hello", 1000, 1500, "B"),
        ];
        let boundaries = detect_boundaries(&words).unwrap();
        assert_eq!(
            boundaries,
            vec![
                Boundary {
                    timestamp_ms: 0,
                    word_index: 0
                },
                Boundary {
                    timestamp_ms: 1500,
                    word_index: 2
                },
            ]
        );
    }

    #[test]
    fn test_boundary_count_equals_transitions_plus_one() {
        let words = vec![
            Word::new("a", 0, 100, "A"),
            Word::new("b", 100, 200, "B"),
            Word::new("c", 200, 300, "B"),
            Word::new("d", 300, 400, "A"),
            Word::new("e", 400, 500, "C"),
        ];
        // Three speaker transitions: A->B, B->A, A->C.
        let boundaries = detect_boundaries(&words).unwrap();
        assert_eq!(boundaries.len(), 4);
    }

    #[test]
    fn test_boundaries_strictly_increasing() {
        let boundaries = detect_boundaries(&single_speaker_words()).unwrap();
        for pair in boundaries.windows(2) {
            assert!(pair[0].word_index < pair[1].word_index);
            assert!(pair[0].timestamp_ms <= pair[1].timestamp_ms);
        }
    }

    #[test]
    fn test_too_few_words_rejected() {
        assert!(matches!(
            detect_boundaries(&[]),
            Err(KapitelError::EmptyTranscript(_))
        ));
        assert!(matches!(
            detect_boundaries(&[Word::new("alone.", 0, 100, "A")]),
            Err(KapitelError::EmptyTranscript(_))
        ));
    }

    #[test]
    fn test_count_speakers() {
        assert_eq!(count_speakers(&single_speaker_words()), 1);
        let words = vec![Word::new("a", 0, 100, "A"), Word::new("b", 100, 200, "B")];
        assert_eq!(count_speakers(&words), 2);
    }
}
