//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    video: &str,
    query: &str,
    limit: usize,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::from_settings(settings)?;
    let index = pipeline.index_manager();

    match index.query(video, query, limit).await {
        Ok(results) => {
            if results.is_empty() {
                Output::info("No matching chunks found.");
                return Ok(());
            }

            Output::header(&format!("Results for '{}' in '{}'", query, video));
            for result in &results {
                Output::search_result(&result.time_span(), result.score, &result.text);
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
