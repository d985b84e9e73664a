//! Video acquisition from URLs.
//!
//! URLs are normalized to a canonical watch form, then downloaded with
//! yt-dlp. The primary strategy fetches a progressive single-format file;
//! if that fails and ffmpeg is available, a second attempt downloads the
//! best video and audio streams and merges them into mp4. Only when both
//! strategies fail does acquisition error, naming each strategy's failure.

mod search;

pub use search::{search_videos, SearchResult};

use crate::error::{Result, SkueError};
use crate::retry::RetryPolicy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Rewrite shortened, shorts, and playlist-laden YouTube URLs to the
/// canonical `https://www.youtube.com/watch?v=ID` form. Anything not
/// recognized as a YouTube URL passes through untouched.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();

    // youtu.be/ID and youtube.com/shorts/ID short forms.
    let patterns = [
        r"(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/shorts/([A-Za-z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).expect("Invalid regex");
        if let Some(caps) = re.captures(url) {
            return format!("https://www.youtube.com/watch?v={}", &caps[1]);
        }
    }

    url.to_string()
}

/// Downloads videos into a target directory, retrying transient failures.
pub struct VideoAcquirer {
    videos_dir: PathBuf,
    retry: RetryPolicy,
}

impl VideoAcquirer {
    pub fn new(videos_dir: &Path) -> Self {
        Self {
            videos_dir: videos_dir.to_path_buf(),
            retry: RetryPolicy::new(2, Duration::from_secs(2)),
        }
    }

    /// Download the video behind `url`. Returns the path of the saved file.
    #[instrument(skip(self))]
    pub async fn acquire(&self, url: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.videos_dir)?;
        let canonical = normalize_url(url);
        if canonical != url {
            debug!(canonical = canonical.as_str(), "normalized url");
        }

        self.retry
            .run("video download", || self.acquire_once(&canonical))
            .await
    }

    async fn acquire_once(&self, url: &str) -> Result<PathBuf> {
        let title = fetch_title(url).await?;
        let stem = unique_stem(&self.videos_dir, &sanitize_stem(&title));
        let template = self.videos_dir.join(format!("{stem}.%(ext)s"));

        info!(title = title.as_str(), "downloading video");

        let progressive_err = match download_progressive(url, &template).await {
            Ok(()) => return find_video_file(&self.videos_dir, &stem),
            Err(e) => e,
        };

        warn!(error = %progressive_err, "progressive download failed, trying merge strategy");

        match download_with_merge(url, &template).await {
            Ok(()) => find_video_file(&self.videos_dir, &stem),
            Err(merge_err) => Err(SkueError::Acquisition {
                strategies: "progressive, merge".to_string(),
                message: format!("progressive: {progressive_err}; merge: {merge_err}"),
            }),
        }
    }
}

/// Ask yt-dlp for the video title without downloading.
async fn fetch_title(url: &str) -> Result<String> {
    let output = run_yt_dlp(&[
        "--print",
        "title",
        "--no-playlist",
        "--skip-download",
        "--no-warnings",
        url,
    ])
    .await?;

    let title = output.trim().lines().next().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err(SkueError::Acquisition {
            strategies: "metadata".to_string(),
            message: "could not determine video title".to_string(),
        });
    }
    Ok(title)
}

/// Single progressive file containing both audio and video.
async fn download_progressive(url: &str, template: &Path) -> Result<()> {
    run_yt_dlp(&[
        "-f",
        "best[acodec!=none][vcodec!=none]/best",
        "--no-playlist",
        "--quiet",
        "--no-warnings",
        "-o",
        template.to_str().unwrap_or_default(),
        url,
    ])
    .await
    .map(|_| ())
}

/// Best separate streams merged into mp4. Needs ffmpeg; degrades to the
/// best progressive format when it is missing.
async fn download_with_merge(url: &str, template: &Path) -> Result<()> {
    let format = if ffmpeg_available().await {
        "bestvideo+bestaudio/best"
    } else {
        warn!("ffmpeg not found, falling back to best progressive format");
        "best"
    };

    run_yt_dlp(&[
        "-f",
        format,
        "--merge-output-format",
        "mp4",
        "--no-playlist",
        "--quiet",
        "--no-warnings",
        "-o",
        template.to_str().unwrap_or_default(),
        url,
    ])
    .await
    .map(|_| ())
}

async fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

async fn run_yt_dlp(args: &[&str]) -> Result<String> {
    let result = Command::new("yt-dlp")
        .args(args)
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
                strategies: "yt-dlp".to_string(),
                message: format!("yt-dlp execution failed: {e}"),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkueError::Acquisition {
            strategies: "yt-dlp".to_string(),
            message: format!("yt-dlp failed: {}", stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Replace filesystem-hostile characters in a title-derived stem.
fn sanitize_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.').to_string();
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed
    }
}

/// Pick a stem that does not collide with any existing file in the dir.
fn unique_stem(dir: &Path, stem: &str) -> String {
    if !stem_taken(dir, stem) {
        return stem.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}");
        if !stem_taken(dir, &candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn stem_taken(dir: &Path, stem: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        Path::new(&entry.file_name())
            .file_stem()
            .is_some_and(|s| s.to_string_lossy() == stem)
    })
}

/// Locate the downloaded file by its stem; yt-dlp picks the extension.
fn find_video_file(dir: &Path, stem: &str) -> Result<PathBuf> {
    for ext in &["mp4", "mkv", "webm", "mov", "avi"] {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.file_stem().is_some_and(|s| s.to_string_lossy() == stem) {
            return Ok(path);
        }
    }

    Err(SkueError::Acquisition {
        strategies: "progressive, merge".to_string(),
        message: "video file not found after download".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_short_url() {
        assert_eq!(
            normalize_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_shorts_url() {
        assert_eq!(
            normalize_url("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_strips_playlist_params() {
        assert_eq!(
            normalize_url("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&index=3"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_canonical_unchanged() {
        let canonical = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(normalize_url(canonical), canonical);
    }

    #[test]
    fn test_normalize_unrecognized_passes_through() {
        let other = "https://example.com/video.mp4";
        assert_eq!(normalize_url(other), other);
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("Rust: The Talk?"), "Rust_ The Talk_");
        assert_eq!(sanitize_stem("  .. "), "video");
    }

    #[test]
    fn test_unique_stem_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("talk.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("talk-2.webm"), b"x").unwrap();

        assert_eq!(unique_stem(dir.path(), "talk"), "talk-3");
        assert_eq!(unique_stem(dir.path(), "other"), "other");
    }
}
