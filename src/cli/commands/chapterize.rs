//! Chapterize command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{ChapterizeSummary, Pipeline};
use anyhow::Result;

/// Run the chapterize command.
pub fn run_chapterize(podcast: Option<&str>, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let summary = match podcast {
        Some(name) => {
            let podcast = pipeline
                .settings()
                .podcast(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown podcast: {}", name))?
                .clone();
            pipeline.chapterize_podcast(&podcast)?
        }
        None => pipeline.chapterize_all()?,
    };

    report(&summary);
    Ok(())
}

fn report(summary: &ChapterizeSummary) {
    if summary.chapterized == 0 && summary.already_chapterized == 0 {
        Output::warning("No transcribed episodes found.");
        Output::info("Transcripts and metadata go under <data_dir>/podcasts/<name>/.");
        return;
    }

    Output::success(&format!("Chapterized {} episode(s)", summary.chapterized));
    if summary.already_chapterized > 0 {
        Output::kv(
            "Already chapterized",
            &summary.already_chapterized.to_string(),
        );
    }
    if summary.missing_metadata > 0 {
        Output::kv("Missing metadata", &summary.missing_metadata.to_string());
    }
    if summary.failed > 0 {
        Output::kv("Failed", &summary.failed.to_string());
    }
    if summary.markers_skipped > 0 {
        Output::kv(
            "Markers skipped (bad timestamps)",
            &summary.markers_skipped.to_string(),
        );
    }
}
