//! Local Whisper engine invoked as a subprocess.
//!
//! Runs the faster-whisper CLI (`whisper-ctranslate2`) against an audio file
//! and parses its JSON output into the canonical transcript model.

use super::{Segment, SpeechEngine, Transcript, TranscriptionOptions};
use crate::error::{Result, SkueError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

const DEFAULT_BINARY: &str = "whisper-ctranslate2";

/// Speech engine backed by the faster-whisper CLI.
pub struct WhisperEngine {
    binary: String,
}

impl WhisperEngine {
    /// Create an engine using the default binary name.
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    /// Create an engine with a custom binary name or path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for WhisperEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON shape written by the whisper CLI.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[allow(dead_code)]
    text: Option<String>,
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    #[instrument(skip(self, options), fields(audio = %audio_path.display()))]
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<Transcript> {
        let output_dir = tempfile::tempdir()?;
        let device = options.resolved_device();
        let compute_type = options.resolved_compute_type();

        info!(
            "Transcribing with model={} device={:?} compute_type={}",
            options.model_size, device, compute_type
        );

        let mut cmd = Command::new(&self.binary);
        cmd.arg(audio_path)
            .arg("--model").arg(options.model_size.to_string())
            .arg("--device").arg(match device {
                super::Device::Gpu => "cuda",
                _ => "cpu",
            })
            .arg("--compute_type").arg(&compute_type)
            .arg("--beam_size").arg(options.beam_size.to_string())
            .arg("--vad_filter").arg(if options.vad_filter { "True" } else { "False" })
            .arg("--word_timestamps").arg(if options.word_timestamps { "True" } else { "False" })
            .arg("--output_format").arg("json")
            .arg("--output_dir").arg(output_dir.path())
            .arg("--verbose").arg("False");

        if let Some(lang) = &options.language {
            cmd.arg("--language").arg(lang);
        }

        let result = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SkueError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(SkueError::Transcription(format!(
                    "{} execution failed: {e}",
                    self.binary
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkueError::ToolFailed(format!(
                "{}: {}",
                self.binary,
                stderr.trim()
            )));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let json_path = output_dir.path().join(format!("{}.json", stem));

        let json_str = std::fs::read_to_string(&json_path).map_err(|e| {
            SkueError::Transcription(format!("Engine produced no JSON output: {e}"))
        })?;

        let parsed: WhisperOutput = serde_json::from_str(&json_str)
            .map_err(|e| SkueError::Transcription(format!("Invalid engine output: {e}")))?;

        // Segments are kept in emitted order; no re-sorting or de-overlap.
        let segments: Vec<Segment> = parsed
            .segments
            .into_iter()
            .map(|s| Segment::new(s.start, s.end, s.text.trim()))
            .collect();

        debug!("Engine emitted {} segments", segments.len());
        Ok(Transcript::new(segments))
    }
}

/// Probe for an NVIDIA accelerator.
pub(super) fn has_cuda() -> bool {
    std::process::Command::new("nvidia-smi")
        .arg("-L")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_output() {
        let json = r#"{
            "text": "Hello world. This is a test.",
            "segments": [
                {"id": 0, "start": 0.0, "end": 2.4, "text": " Hello world."},
                {"id": 1, "start": 2.4, "end": 5.1, "text": " This is a test."}
            ],
            "language": "en"
        }"#;

        let parsed: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments[0].start, 0.0);
        assert_eq!(parsed.segments[1].text.trim(), "This is a test.");
    }

    #[test]
    fn test_engine_binary_configurable() {
        let engine = WhisperEngine::with_binary("/opt/whisper/bin/whisper-ctranslate2");
        assert_eq!(engine.binary, "/opt/whisper/bin/whisper-ctranslate2");
    }
}
