//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::timestamp::format_seconds;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, k: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let pipeline = Pipeline::new(settings)?;
    let retriever = pipeline.open_retriever()?;

    let spinner = Output::spinner("Searching...");
    let results = retriever.search(query, k).await;
    spinner.finish_and_clear();

    match results {
        Ok(matches) => {
            Output::success(&format!("Found {} match(es)", matches.len()));
            for m in &matches {
                Output::chapter_match(
                    &m.payload.podcast_title,
                    &m.payload.episode_title,
                    &m.payload.chapter_title,
                    &format_seconds(m.payload.start_timestamp),
                    m.score,
                    &m.payload.chapter_transcript,
                );
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
