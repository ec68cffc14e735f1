//! Kapitel - Podcast Chapterization and Retrieval
//!
//! A CLI tool that splits diarized podcast transcripts into chapters,
//! indexes chapter embeddings, and serves semantic retrieval for question
//! answering.
//!
//! The name "Kapitel" is the Norwegian word for "chapter."
//!
//! # Overview
//!
//! Kapitel allows you to:
//! - Split word-level transcripts into chapters at sentence or speaker
//!   boundaries, guided by the chapter markers feeds publish
//! - Build a deduplicated embedding index over all chapters
//! - Search chapters semantically and ask questions with cited sources
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and the podcast registry
//! - `transcript` - Diarized transcript and episode metadata models
//! - `timestamp` - Timestamp string parsing and formatting
//! - `feed` - Feed configs and chapter-marker extraction
//! - `chapterize` - Boundary detection and chapter splitting
//! - `embedding` - Embedding generation and token accounting
//! - `index` - The append-only embedding index and its persistence
//! - `retrieval` - Top-k similarity search over the index
//! - `qa` - Question answering over retrieved chapters
//! - `pipeline` - Run coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kapitel::config::Settings;
//! use kapitel::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     // Chapterize pending episodes, then index the chapters
//!     pipeline.chapterize_all()?;
//!     let report = pipeline.update_index().await?;
//!     println!("Indexed {} chapters", report.appended);
//!
//!     Ok(())
//! }
//! ```

pub mod chapterize;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod feed;
pub mod index;
pub mod openai;
pub mod pipeline;
pub mod qa;
pub mod retrieval;
pub mod storage;
pub mod timestamp;
pub mod transcript;

pub use error::{KapitelError, Result};
