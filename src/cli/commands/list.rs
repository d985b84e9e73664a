//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::scan_library;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::collections::HashSet;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let entries = scan_library(
        &settings.videos_dir(),
        &settings.audio_dir(),
        &settings.transcripts_dir(),
    )?;

    let pipeline = Pipeline::from_settings(settings)?;
    let indexed: HashSet<String> = pipeline
        .index_manager()
        .list_indexed()
        .await?
        .into_iter()
        .map(|v| v.video_name)
        .collect();

    if entries.is_empty() && indexed.is_empty() {
        Output::info("Library is empty. Use 'skue process <input>' to add a video.");
        return Ok(());
    }

    Output::header(&format!("Library ({})", entries.len()));
    println!();
    for entry in &entries {
        let mut stages = Vec::new();
        if entry.video_path.is_some() {
            stages.push("video");
        }
        if entry.audio_path.is_some() {
            stages.push("audio");
        }
        if entry.has_transcript() {
            stages.push("transcript");
        }
        if indexed.contains(&entry.name) {
            stages.push("indexed");
        }
        Output::list_item(&format!("{} [{}]", entry.name, stages.join(", ")));
    }

    // Indexed videos whose files were removed from disk.
    let orphaned: Vec<&String> = indexed
        .iter()
        .filter(|name| !entries.iter().any(|e| &e.name == *name))
        .collect();
    if !orphaned.is_empty() {
        println!();
        Output::header("Indexed without library files");
        for name in orphaned {
            Output::list_item(name);
        }
    }

    Ok(())
}
