//! Download command implementation.

use crate::acquire::VideoAcquirer;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the download command.
pub async fn run_download(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Download) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skue doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let acquirer = VideoAcquirer::new(&settings.videos_dir());
    let spinner = Output::spinner("Downloading video...");

    match acquirer.acquire(url).await {
        Ok(path) => {
            spinner.finish_and_clear();
            Output::success(&format!("Downloaded to {}", path.display()));
            Output::info(&format!(
                "Process it with: skue process \"{}\"",
                path.display()
            ));
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Download failed: {}", e));
            Err(e.into())
        }
    }
}
