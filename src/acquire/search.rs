//! YouTube search via yt-dlp's ytsearch pseudo-URL.

use crate::error::{Result, SkueError};
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// One search hit with enough metadata to pick a video to process.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub channel: Option<String>,
}

impl SearchResult {
    /// Canonical watch URL for this hit.
    pub fn watch_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", self.id))
    }
}

/// Search YouTube and return up to `limit` flat results without downloading.
#[instrument]
pub async fn search_videos(query: &str, limit: usize) -> Result<Vec<SearchResult>> {
    let limit = limit.max(1);
    let search_url = format!("ytsearch{limit}:{query}");

    let result = Command::new("yt-dlp")
        .arg(&search_url)
        .arg("--dump-json")
        .arg("--flat-playlist")
        .arg("--skip-download")
        .arg("--no-warnings")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SkueError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(SkueError::Acquisition {
                strategies: "search".to_string(),
                message: format!("yt-dlp execution failed: {e}"),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkueError::Acquisition {
            strategies: "search".to_string(),
            message: format!("search failed: {}", stderr.trim()),
        });
    }

    // One JSON object per line; skip lines that do not parse.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let results: Vec<SearchResult> = stdout
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    debug!(count = results.len(), "search results");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_parsing() {
        let line = r#"{"id":"abc123def45","title":"A Talk","duration":1800.0,"channel":"Conf"}"#;
        let result: SearchResult = serde_json::from_str(line).unwrap();
        assert_eq!(result.title, "A Talk");
        assert_eq!(
            result.watch_url(),
            "https://www.youtube.com/watch?v=abc123def45"
        );
    }

    #[test]
    fn test_explicit_url_preferred() {
        let line = r#"{"id":"abc123def45","title":"A Talk","url":"https://www.youtube.com/watch?v=abc123def45"}"#;
        let result: SearchResult = serde_json::from_str(line).unwrap();
        assert_eq!(
            result.watch_url(),
            "https://www.youtube.com/watch?v=abc123def45"
        );
    }
}
