//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let pipeline = Pipeline::new(settings)?;
    let report = pipeline.update_index().await?;

    if report.considered == 0 {
        Output::warning("No chapterized episodes found. Run 'kapitel chapterize' first.");
        return Ok(());
    }

    Output::success(&format!(
        "Indexed {} new chapter(s) out of {} considered",
        report.appended, report.considered
    ));
    Output::kv("Already indexed", &report.skipped_duplicate.to_string());
    Output::kv("Empty chapters skipped", &report.skipped_empty.to_string());
    Output::kv(
        "Over token budget",
        &report.skipped_over_budget.to_string(),
    );

    Ok(())
}
