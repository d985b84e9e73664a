//! Transcription module for Skue.
//!
//! Wraps an external speech-to-text engine behind a narrow port and
//! normalizes its output into the canonical [`Transcript`] model. The engine
//! is invoked once per call; there are no partial results and no automatic
//! retry, since model and resource errors are not recoverable by waiting.

mod format;
mod models;
mod whisper;

pub use format::{format_transcript, OutputFormat, SegmentExport, TranscriptExport};
pub use models::{format_timestamp, Segment, Transcript};
pub use whisper::WhisperEngine;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whisper model size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl std::str::FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" | "large-v3" => Ok(ModelSize::Large),
            _ => Err(format!("Unknown model size: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        };
        write!(f, "{}", s)
    }
}

/// Compute device for the speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Resolve to gpu when an accelerator is detected, else cpu.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Device::Auto),
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            _ => Err(format!("Unknown device: {}", s)),
        }
    }
}

/// Options passed to the speech engine for a single transcription call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionOptions {
    /// Whisper model size.
    pub model_size: ModelSize,
    /// Compute device.
    pub device: Device,
    /// Compute precision; None picks int8 on cpu, float16 on gpu.
    pub compute_type: Option<String>,
    /// Beam width; 1 is greedy decoding, fastest on cpu.
    pub beam_size: u32,
    /// ISO language code; None means auto-detect.
    pub language: Option<String>,
    /// Skip silent spans with voice activity detection.
    pub vad_filter: bool,
    /// Request word-level timestamps from the engine.
    pub word_timestamps: bool,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model_size: ModelSize::Base,
            device: Device::Auto,
            compute_type: None,
            beam_size: 1,
            language: Some("en".to_string()),
            vad_filter: false,
            word_timestamps: false,
        }
    }
}

impl TranscriptionOptions {
    /// Resolve `Auto` to a concrete device by probing for an accelerator.
    pub fn resolved_device(&self) -> Device {
        match self.device {
            Device::Auto => {
                if whisper::has_cuda() {
                    Device::Gpu
                } else {
                    Device::Cpu
                }
            }
            d => d,
        }
    }

    /// Precision to request: explicit setting, or a device-appropriate default.
    pub fn resolved_compute_type(&self) -> String {
        if let Some(ct) = &self.compute_type {
            return ct.clone();
        }
        match self.resolved_device() {
            Device::Gpu => "float16".to_string(),
            _ => "int8".to_string(),
        }
    }
}

/// Port to an external speech-to-text engine.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe an audio file into timestamped segments.
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscriptionOptions,
    ) -> Result<Transcript>;
}

/// Write the plain-text transcript artifact for a video stem.
///
/// The text file carries no timestamps; the segment list persisted alongside
/// it in the chunk store is the authoritative source for chunking.
pub fn save_transcript(
    transcript: &mut Transcript,
    stem: &str,
    transcripts_dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(transcripts_dir)?;
    let path = transcripts_dir.join(format!("{}.txt", stem));
    std::fs::write(&path, &transcript.text)?;
    transcript.source_path = Some(path.clone());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_size_parse() {
        assert_eq!("base".parse::<ModelSize>().unwrap(), ModelSize::Base);
        assert_eq!("large-v3".parse::<ModelSize>().unwrap(), ModelSize::Large);
        assert!("huge".parse::<ModelSize>().is_err());
    }

    #[test]
    fn test_device_parse() {
        assert_eq!("cuda".parse::<Device>().unwrap(), Device::Gpu);
        assert_eq!("auto".parse::<Device>().unwrap(), Device::Auto);
    }

    #[test]
    fn test_compute_type_default_for_cpu() {
        let options = TranscriptionOptions {
            device: Device::Cpu,
            ..Default::default()
        };
        assert_eq!(options.resolved_compute_type(), "int8");
    }

    #[test]
    fn test_compute_type_explicit_wins() {
        let options = TranscriptionOptions {
            device: Device::Cpu,
            compute_type: Some("float32".to_string()),
            ..Default::default()
        };
        assert_eq!(options.resolved_compute_type(), "float32");
    }

    #[test]
    fn test_save_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new(vec![Segment::new(0.0, 2.0, "hello")]);

        let path = save_transcript(&mut transcript, "myvideo", dir.path()).unwrap();

        assert!(path.ends_with("myvideo.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        assert_eq!(transcript.source_path.as_deref(), Some(path.as_path()));
    }
}
