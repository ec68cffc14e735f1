//! Podcast feed configuration.
//!
//! Each podcast pulls episodes from either a YouTube channel or an RSS
//! feed; the two carry different knobs, so the config is a tagged variant
//! dispatched where needed rather than inspected at runtime.

mod chapters;

pub use chapters::{extract_markers, MarkerStyle};

use crate::error::{KapitelError, Result};
use serde::{Deserialize, Serialize};

/// Source feed for a podcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedConfig {
    /// A YouTube channel.
    Youtube {
        /// The channel's external id.
        channel_id: String,
    },
    /// An RSS feed.
    Rss {
        /// Feed URL.
        url: String,
        /// Episode-title substrings to skip (rebroadcasts, shorts, ...).
        #[serde(default)]
        filter_out: Vec<String>,
    },
}

impl FeedConfig {
    /// Validate the feed definition.
    pub fn validate(&self) -> Result<()> {
        match self {
            FeedConfig::Youtube { channel_id } => {
                if channel_id.is_empty() {
                    return Err(KapitelError::Feed("Empty YouTube channel id".to_string()));
                }
            }
            FeedConfig::Rss { url: feed_url, .. } => {
                url::Url::parse(feed_url)
                    .map_err(|e| KapitelError::Feed(format!("Bad RSS URL '{}': {}", feed_url, e)))?;
            }
        }
        Ok(())
    }

    /// Whether an episode title passes the feed's filters.
    pub fn accepts_title(&self, title: &str) -> bool {
        match self {
            FeedConfig::Youtube { .. } => true,
            FeedConfig::Rss { filter_out, .. } => {
                !filter_out.iter().any(|needle| title.contains(needle))
            }
        }
    }
}

impl std::fmt::Display for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedConfig::Youtube { .. } => write!(f, "youtube"),
            FeedConfig::Rss { .. } => write!(f, "rss"),
        }
    }
}

/// One podcast in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Podcast {
    /// Storage key, used in data paths and index payloads.
    pub name: String,
    /// Display title, shown in QA prompts and results.
    pub title: String,
    /// Host display name.
    pub host: String,
    /// How chapter markers appear in episode descriptions.
    pub marker_style: MarkerStyle,
    /// Where episodes come from.
    pub feed: FeedConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_validation() {
        assert!(FeedConfig::Youtube {
            channel_id: "UC2D2CMWXMOVWx7giW1n3LIg".to_string()
        }
        .validate()
        .is_ok());

        assert!(FeedConfig::Youtube {
            channel_id: String::new()
        }
        .validate()
        .is_err());

        assert!(FeedConfig::Rss {
            url: "https://example.libsyn.com/rss".to_string(),
            filter_out: Vec::new(),
        }
        .validate()
        .is_ok());

        assert!(FeedConfig::Rss {
            url: "not a url".to_string(),
            filter_out: Vec::new(),
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_rss_title_filter() {
        let feed = FeedConfig::Rss {
            url: "https://example.libsyn.com/rss".to_string(),
            filter_out: vec!["Rebroadcast".to_string(), "Qualy".to_string()],
        };
        assert!(feed.accepts_title("#42 - Sleep and longevity"));
        assert!(!feed.accepts_title("#17 Rebroadcast - Training"));
    }

    #[test]
    fn test_feed_config_toml_shape() {
        let toml_str = r#"
            name = "hubermanlab"
            title = "Huberman Lab Podcast"
            host = "Dr. Andrew Huberman"
            marker_style = "timestamp-lines"

            [feed]
            type = "youtube"
            channel_id = "UC2D2CMWXMOVWx7giW1n3LIg"
        "#;
        let podcast: Podcast = toml::from_str(toml_str).unwrap();
        assert_eq!(podcast.name, "hubermanlab");
        assert!(matches!(podcast.feed, FeedConfig::Youtube { .. }));
    }
}
