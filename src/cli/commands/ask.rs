//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::qa::QaEngine;
use crate::timestamp::format_seconds;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut qa_settings = settings.qa.clone();
    if let Some(model) = model {
        qa_settings.model = model;
    }
    if let Some(k) = k {
        qa_settings.top_k = k;
    }

    let pipeline = Pipeline::new(settings)?;
    let retriever = Arc::new(pipeline.open_retriever()?);
    let engine = QaEngine::new(retriever, &qa_settings);

    let spinner = Output::spinner("Searching indexed chapters...");

    match engine.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::chapter_match(
                        &source.payload.podcast_title,
                        &source.payload.episode_title,
                        &source.payload.chapter_title,
                        &format_seconds(source.payload.start_timestamp),
                        source.score,
                        &source.payload.chapter_transcript,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
