//! Error types for Kapitel.

use thiserror::Error;

/// Library-level error type for Kapitel operations.
#[derive(Error, Debug)]
pub enum KapitelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Empty transcript: {0}")]
    EmptyTranscript(String),

    #[error("The index is empty, nothing to retrieve")]
    EmptyIndex,

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Chapterization failed: {0}")]
    Chapterize(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("QA error: {0}")]
    Qa(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Kapitel operations.
pub type Result<T> = std::result::Result<T, KapitelError>;
