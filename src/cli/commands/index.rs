//! Index command implementation.

use crate::cli::{IndexAction, Output};
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::transcription::Transcript;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Run the index command.
pub async fn run_index(action: &IndexAction, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::from_settings(settings)?;
    let index = pipeline.index_manager();
    let store = pipeline.store();

    match action {
        IndexAction::Build { video, force } => {
            let transcript = require_transcript(&store, video)?;
            let spinner = Output::spinner("Building index...");
            match index.build(video, &transcript, *force).await {
                Ok(count) => {
                    spinner.finish_and_clear();
                    Output::success(&format!("Indexed '{}' ({} chunks)", video, count));
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    Output::error(&format!("Index build failed: {}", e));
                    return Err(e.into());
                }
            }
        }

        IndexAction::Rebuild { video } => {
            let transcript = require_transcript(&store, video)?;
            let spinner = Output::spinner("Rebuilding index...");
            match index.rebuild(video, &transcript).await {
                Ok(count) => {
                    spinner.finish_and_clear();
                    Output::success(&format!("Rebuilt index for '{}' ({} chunks)", video, count));
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    Output::error(&format!("Rebuild failed: {}", e));
                    return Err(e.into());
                }
            }
        }

        IndexAction::Delete { video } => {
            index.delete(video).await?;
            Output::success(&format!("Deleted index for '{}'", video));
        }

        IndexAction::Batch { force } => {
            let names = store.list_transcripts()?;
            if names.is_empty() {
                Output::info("No stored transcripts. Use 'skue process <input>' first.");
                return Ok(());
            }

            let mut videos: Vec<(String, Transcript)> = Vec::new();
            for name in &names {
                if let Some(transcript) = store.get_transcript(name)? {
                    videos.push((name.clone(), transcript));
                }
            }

            let pb = Output::progress_bar(videos.len() as u64, "Building indexes");
            let report = index.batch_build(&videos, *force).await?;
            pb.finish_and_clear();

            Output::success(&format!(
                "Indexed {}/{} videos",
                report.succeeded.len(),
                report.total()
            ));
            if !report.skipped.is_empty() {
                Output::info(&format!(
                    "Skipped {} already indexed (use --force to reindex)",
                    report.skipped.len()
                ));
            }
            for (video, error) in &report.failed {
                Output::warning(&format!("{}: {}", video, error));
            }
        }

        IndexAction::List => {
            let videos = index.list_indexed().await?;
            if videos.is_empty() {
                Output::info("No indexed videos. Use 'skue process <input>' to add one.");
            } else {
                Output::header(&format!("Indexed Videos ({})", videos.len()));
                println!();
                for video in &videos {
                    Output::video_info(
                        &video.video_name,
                        video.chunk_count,
                        &format_date(&video.indexed_at),
                    );
                }
            }
        }
    }

    Ok(())
}

fn require_transcript(
    store: &crate::store::SqliteChunkStore,
    video: &str,
) -> Result<Transcript> {
    match store.get_transcript(video)? {
        Some(t) => Ok(t),
        None => {
            Output::error(&format!("No stored transcript for '{}'.", video));
            Output::info("Use 'skue process <input>' to transcribe it first.");
            Err(anyhow::anyhow!("no transcript for '{}'", video))
        }
    }
}

fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}
