//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::transcription::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the export command.
pub async fn run_export(
    video: &str,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let pipeline = Pipeline::from_settings(settings)?;
    let store = pipeline.store();

    let Some(transcript) = store.get_transcript(video)? else {
        Output::error(&format!("No stored transcript for '{}'.", video));
        Output::info("Use 'skue list' to see available videos.");
        return Err(anyhow::anyhow!("no transcript for '{}'", video));
    };

    let output_str = format_transcript(&transcript, video, output_format);

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} segments)",
                video,
                path,
                transcript.segments.len()
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
