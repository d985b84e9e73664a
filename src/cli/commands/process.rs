//! Process command - the full URL-to-index pipeline.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the process command. `input` is a URL or a local video file.
pub async fn run_process(input: &str, force: bool, settings: Settings) -> Result<()> {
    let local_file = Path::new(input).is_file();

    let operation = if local_file {
        Operation::Transcribe
    } else {
        Operation::Process
    };
    if let Err(e) = preflight::check(operation) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skue doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::from_settings(settings)?;
    let spinner = Output::spinner("Processing video...");

    let result = if local_file {
        pipeline.process_file(Path::new(input), force).await
    } else {
        pipeline.process_url(input, force).await
    };

    match result {
        Ok(outcome) => {
            spinner.finish_and_clear();
            Output::success(&format!("Processed '{}'", outcome.video_name));
            Output::kv("Video", &outcome.video_path.display().to_string());
            Output::kv("Audio", &outcome.audio_path.display().to_string());
            Output::kv("Transcript", &outcome.transcript_path.display().to_string());
            Output::kv("Chunks indexed", &outcome.chunks_indexed.to_string());
            println!();
            Output::info(&format!(
                "Ask about it with: skue ask \"{}\" \"<question>\"",
                outcome.video_name
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Processing failed: {}", e));
            Err(e.into())
        }
    }
}
