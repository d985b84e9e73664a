//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::llm::OllamaClient;
use crate::pipeline::Pipeline;
use crate::summarize::{summarize, SummaryStyle};
use anyhow::Result;
use std::time::Duration;

/// Run the summarize command.
pub async fn run_summarize(
    video: &str,
    style: &str,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skue doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let style: SummaryStyle = style.parse()?;
    let model = model.unwrap_or_else(|| settings.llm.model.clone());

    let mut client = OllamaClient::new(&model)
        .with_timeout(Duration::from_secs(settings.llm.timeout_seconds));
    if let Some(binary) = &settings.llm.binary {
        client = client.with_binary(binary);
    }

    let pipeline = Pipeline::from_settings(settings)?;
    let store = pipeline.store();

    let Some(transcript) = store.get_transcript(video)? else {
        Output::error(&format!("No stored transcript for '{}'.", video));
        Output::info("Use 'skue process <input>' to transcribe it first.");
        return Err(anyhow::anyhow!("no transcript for '{}'", video));
    };

    let spinner = Output::spinner("Summarizing...");

    match summarize(&client, video, &transcript, style).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            println!("\n{}\n", summary);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Summarization failed: {}", e));
            Err(e.into())
        }
    }
}
