//! Audio extraction from downloaded video files.
//!
//! Produces a 16 kHz mono PCM WAV, the input format the speech engine
//! expects. The system ffmpeg is tried first; a configurable fallback
//! binary covers machines where ffmpeg is not on PATH.

use crate::error::{Result, SkueError};
use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Extracts speech-ready WAV audio from video files.
pub struct AudioExtractor {
    audio_dir: PathBuf,
    /// Binary tried when the system ffmpeg is missing.
    fallback_binary: Option<String>,
    retry: RetryPolicy,
}

impl AudioExtractor {
    pub fn new(audio_dir: &Path) -> Self {
        Self {
            audio_dir: audio_dir.to_path_buf(),
            fallback_binary: None,
            retry: RetryPolicy::new(2, Duration::from_secs(1)),
        }
    }

    /// Configure a fallback ffmpeg binary path.
    pub fn with_fallback_binary(mut self, binary: Option<String>) -> Self {
        self.fallback_binary = binary;
        self
    }

    /// Extract `<stem>.wav` from a video file. Returns the WAV path.
    #[instrument(skip(self))]
    pub async fn extract(&self, video_path: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.audio_dir)?;

        let stem = video_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                SkueError::AudioExtraction(format!(
                    "video path has no usable file stem: {}",
                    video_path.display()
                ))
            })?;
        let wav_path = self.audio_dir.join(format!("{stem}.wav"));

        info!(video = %video_path.display(), "extracting audio");

        self.retry
            .run("audio extraction", || self.extract_once(video_path, &wav_path))
            .await?;

        Ok(wav_path)
    }

    async fn extract_once(&self, video_path: &Path, wav_path: &Path) -> Result<()> {
        match run_ffmpeg("ffmpeg", video_path, wav_path).await {
            Ok(()) => return Ok(()),
            Err(SkueError::ToolNotFound(_)) => {
                let Some(fallback) = &self.fallback_binary else {
                    return Err(SkueError::ToolNotFound("ffmpeg".into()));
                };
                warn!(fallback = fallback.as_str(), "system ffmpeg not found, using fallback");
                run_ffmpeg(fallback, video_path, wav_path).await
            }
            Err(e) => Err(e),
        }
    }
}

/// 16 kHz mono signed 16-bit PCM, no video stream.
async fn run_ffmpeg(binary: &str, source: &Path, dest: &Path) -> Result<()> {
    let result = Command::new(binary)
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg("16000")
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SkueError::AudioExtraction(format!(
                "{binary} failed: {}",
                err.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkueError::ToolNotFound(binary.into()))
        }
        Err(e) => Err(SkueError::AudioExtraction(format!("{binary} error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_stem_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = AudioExtractor::new(dir.path());
        let err = extractor.extract(Path::new("..")).await.unwrap_err();
        assert!(matches!(err, SkueError::AudioExtraction(_)));
    }

    #[test]
    fn test_fallback_binary_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = AudioExtractor::new(dir.path())
            .with_fallback_binary(Some("/opt/ffmpeg/bin/ffmpeg".into()));
        assert_eq!(
            extractor.fallback_binary.as_deref(),
            Some("/opt/ffmpeg/bin/ffmpeg")
        );
    }
}
