//! CLI module for Kapitel.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kapitel - Podcast Chapterization and Retrieval
///
/// Splits diarized podcast transcripts into chapters, indexes chapter
/// embeddings, and answers questions over the indexed chapters.
/// The name "Kapitel" is the Norwegian word for "chapter."
#[derive(Parser, Debug)]
#[command(name = "kapitel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chapterize transcribed episodes into chapter maps
    Chapterize {
        /// Podcast name (all registered podcasts if omitted)
        #[arg(short, long)]
        podcast: Option<String>,
    },

    /// Embed chapterized episodes into the index
    Index,

    /// Search indexed chapters semantically
    Search {
        /// Search query
        query: String,

        /// Number of matches to return
        #[arg(short, long, default_value = "5")]
        k: usize,
    },

    /// Ask a question and get an answer grounded in indexed chapters
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of chapters to retrieve as context
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start HTTP API server for retrieval and QA
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
