//! Configuration settings for Kapitel.

use crate::embedding::{
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, EMBEDDING_TOKEN_LIMIT,
};
use crate::feed::{FeedConfig, MarkerStyle, Podcast};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub qa: QaSettings,
    /// The podcast registry.
    pub podcasts: Vec<Podcast>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            embedding: EmbeddingSettings::default(),
            index: IndexSettings::default(),
            qa: QaSettings::default(),
            podcasts: default_podcasts(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.kapitel".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS as u32,
        }
    }
}

/// Indexing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Token budget per chapter; oversized chapters are skipped and counted.
    pub token_limit: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            token_limit: EMBEDDING_TOKEN_LIMIT,
        }
    }
}

/// Question-answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaSettings {
    /// LLM model for answer generation.
    pub model: String,
    /// Number of chapters retrieved per question.
    pub top_k: usize,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            top_k: 4,
        }
    }
}

/// The stock podcast registry, overridable from the config file.
fn default_podcasts() -> Vec<Podcast> {
    vec![
        Podcast {
            name: "hubermanlab".to_string(),
            title: "Huberman Lab Podcast".to_string(),
            host: "Dr. Andrew Huberman".to_string(),
            feed: FeedConfig::Youtube {
                channel_id: "UC2D2CMWXMOVWx7giW1n3LIg".to_string(),
            },
            marker_style: MarkerStyle::TimestampLines,
        },
        Podcast {
            name: "PeterAttiaMD".to_string(),
            title: "The Peter Attia Drive Podcast".to_string(),
            host: "Dr. Peter Attia".to_string(),
            feed: FeedConfig::Rss {
                url: "https://peterattiadrive.libsyn.com/rss".to_string(),
                filter_out: vec![
                    "rebroadcast".to_string(),
                    "Rebroadcast".to_string(),
                    "re-release".to_string(),
                    "Qualy".to_string(),
                ],
            },
            marker_style: MarkerStyle::HtmlList,
        },
    ]
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::KapitelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kapitel")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Find a registered podcast by name.
    pub fn podcast(&self, name: &str) -> Option<&Podcast> {
        self.podcasts.iter().find(|p| p.name == name)
    }
}
