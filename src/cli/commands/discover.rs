//! Discover command - search YouTube for videos to process.

use crate::acquire;
use crate::cli::preflight::{self, Operation};
use crate::cli::{format_duration, Output};
use anyhow::Result;

/// Run the discover command.
pub async fn run_discover(query: &str, limit: usize) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Download) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skue doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Searching YouTube...");
    let results = match acquire::search_videos(query, limit).await {
        Ok(results) => {
            spinner.finish_and_clear();
            results
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if results.is_empty() {
        Output::info("No results found.");
        return Ok(());
    }

    Output::header(&format!("Results for '{}'", query));
    println!();
    for result in &results {
        let duration = result
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "unknown length".to_string());
        let channel = result.channel.as_deref().unwrap_or("unknown channel");
        Output::list_item(&format!("{} ({}, {})", result.title, channel, duration));
        Output::kv("url", &result.watch_url());
    }

    println!();
    Output::info("Process a result with: skue process <url>");
    Ok(())
}
