//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::llm::OllamaClient;
use crate::pipeline::Pipeline;
use crate::qa::QaEngine;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skue doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.llm.model.clone());
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);

    let mut client = OllamaClient::new(&model)
        .with_timeout(Duration::from_secs(settings.llm.timeout_seconds));
    if let Some(binary) = &settings.llm.binary {
        client = client.with_binary(binary);
    }

    let pipeline = Pipeline::from_settings(settings)?;
    let engine = QaEngine::new(pipeline.index_manager(), Arc::new(client)).with_top_k(top_k);

    let spinner = Output::spinner("Thinking...");

    match engine.ask(video, question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for (i, source) in response.sources.iter().enumerate() {
                    Output::search_result(
                        &format!("[{}] {}", i + 1, source.time_span()),
                        source.score,
                        &source.text,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
