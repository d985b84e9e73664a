//! Skue CLI entry point.

use anyhow::Result;
use clap::Parser;
use skue::cli::{commands, Cli, Commands};
use skue::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skue={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Download { url } => {
            commands::run_download(url, settings).await?;
        }

        Commands::Process { input, force } => {
            commands::run_process(input, *force, settings).await?;
        }

        Commands::Index { action } => {
            commands::run_index(action, settings).await?;
        }

        Commands::Ask {
            video,
            question,
            model,
            top_k,
        } => {
            commands::run_ask(video, question, model.clone(), *top_k, settings).await?;
        }

        Commands::Search {
            video,
            query,
            limit,
        } => {
            commands::run_search(video, query, *limit, settings).await?;
        }

        Commands::Discover { query, limit } => {
            commands::run_discover(query, *limit).await?;
        }

        Commands::Summarize {
            video,
            style,
            model,
        } => {
            commands::run_summarize(video, style, model.clone(), settings).await?;
        }

        Commands::Export {
            video,
            output,
            format,
        } => {
            commands::run_export(video, output.clone(), format, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
