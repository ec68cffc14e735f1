//! Chapter-marker extraction from episode descriptions.
//!
//! Feeds publish chapter lists in a few house styles: a `Timestamps`
//! header with one `hh:mm:ss Title` line per chapter, an `OUTLINE:` block
//! with `h:mm:ss - Title` lines, or an HTML `<li>` list with the timestamp
//! in brackets. Extraction is best-effort; a description with no
//! recognizable chapter block yields no markers.

use crate::transcript::ChapterMarker;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Timestamp with optional hour block and required minute block, e.g.
/// `2:30`, `1:02:03`. Hours cap at 23, minutes/seconds at 59.
const PARTIAL_TIMESTAMP: &str = r"(?:(?:([01]?\d|2[0-3]):)?([0-5]?\d):)([0-5]?\d)";

/// How a feed formats chapter markers in episode descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerStyle {
    /// `Timestamps` header, then `hh:mm:ss Title` lines.
    TimestampLines,
    /// `OUTLINE:` header, then `h:mm:ss - Title` lines.
    OutlineDashes,
    /// `<li>Title [h:mm:ss]</li>` items, possibly wrapped in `<a>` tags.
    HtmlList,
}

/// Extract chapter markers from an episode description.
pub fn extract_markers(style: MarkerStyle, description: &str) -> Vec<ChapterMarker> {
    MarkerExtractor::new(style).extract(description)
}

/// Compiled extractor for one marker style.
pub struct MarkerExtractor {
    style: MarkerStyle,
    line_regex: Regex,
    href_regex: Regex,
}

impl MarkerExtractor {
    /// Compile the patterns for a style.
    pub fn new(style: MarkerStyle) -> Self {
        let line_pattern = match style {
            MarkerStyle::TimestampLines => r"(?m)^([0-9][0-9]:[0-5][0-9]:[0-5][0-9]) +(.+)$".to_string(),
            MarkerStyle::OutlineDashes => format!(r"(?m)^{} - (.+)$", PARTIAL_TIMESTAMP),
            MarkerStyle::HtmlList => {
                format!(r"<li.*?>(.*?[\[(].*?){}(.*?[\])].*?</li>)", PARTIAL_TIMESTAMP)
            }
        };

        Self {
            style,
            line_regex: Regex::new(&line_pattern).expect("Invalid marker pattern"),
            href_regex: Regex::new(r"<a href=.*?>(.*?)</a>").expect("Invalid href pattern"),
        }
    }

    /// Extract `(timestamp, title)` pairs from a description.
    pub fn extract(&self, description: &str) -> Vec<ChapterMarker> {
        match self.style {
            MarkerStyle::TimestampLines => self.extract_timestamp_lines(description),
            MarkerStyle::OutlineDashes => self.extract_outline_dashes(description),
            MarkerStyle::HtmlList => self.extract_html_list(description),
        }
    }

    fn extract_timestamp_lines(&self, description: &str) -> Vec<ChapterMarker> {
        let Some(body) = section_after(description, "Timestamps") else {
            return Vec::new();
        };

        self.line_regex
            .captures_iter(body)
            .map(|caps| ChapterMarker::new(caps[1].trim(), caps[2].trim()))
            .collect()
    }

    fn extract_outline_dashes(&self, description: &str) -> Vec<ChapterMarker> {
        let Some(body) = section_after(description, "OUTLINE:") else {
            return Vec::new();
        };

        self.line_regex
            .captures_iter(body)
            .map(|caps| {
                let timestamp = assemble_timestamp(
                    caps.get(1).map(|m| m.as_str()),
                    &caps[2],
                    &caps[3],
                );
                ChapterMarker::new(&timestamp, caps[4].trim())
            })
            .collect()
    }

    fn extract_html_list(&self, description: &str) -> Vec<ChapterMarker> {
        // Replace every href tag with its contained text first, so the
        // timestamp pattern sees plain `Title [h:mm:ss]` items.
        let plain = self.href_regex.replace_all(description, "$1");

        self.line_regex
            .captures_iter(&plain)
            .map(|caps| {
                let timestamp = assemble_timestamp(
                    caps.get(2).map(|m| m.as_str()),
                    &caps[3],
                    &caps[4],
                );
                let title = caps[1]
                    .trim_end()
                    .trim_end_matches(&['[', '('][..])
                    .trim_end()
                    .to_string();
                ChapterMarker::new(&timestamp, &title)
            })
            .collect()
    }
}

/// The part of `description` after the first occurrence of `header`, or
/// `None` when the header is missing.
fn section_after<'a>(description: &'a str, header: &str) -> Option<&'a str> {
    description
        .find(header)
        .map(|pos| &description[pos + header.len()..])
}

/// Reassemble a possibly truncated timestamp from its matched blocks.
fn assemble_timestamp(hours: Option<&str>, minutes: &str, seconds: &str) -> String {
    match hours {
        Some(h) if !h.is_empty() => format!("{}:{}:{}", h, minutes, seconds),
        _ => format!("{}:{}", minutes, seconds),
    }
}
