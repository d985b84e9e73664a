//! Data models for transcription.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single time-coded span of transcribed speech.
///
/// Produced by the speech engine, one per detected utterance; immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Transcribed text content.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Word count of the segment text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A complete transcript for one video.
///
/// Segments are kept in the order the engine emitted them; the transcript is
/// never mutated after creation (re-transcription builds a new one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Full transcript text (concatenated segments).
    pub text: String,
    /// Individual timestamped segments.
    pub segments: Vec<Segment>,
    /// Where the plain-text artifact was written, once saved.
    pub source_path: Option<PathBuf>,
}

impl Transcript {
    /// Create a new transcript from segments; the full text is derived.
    pub fn new(segments: Vec<Segment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            text,
            segments,
            source_path: None,
        }
    }

    /// Total duration in seconds (end of the last segment).
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
    }

    /// Total word count across all segments.
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.word_count()).sum()
    }

    /// Format the transcript with timestamps for display.
    pub fn format_with_timestamps(&self) -> String {
        self.segments
            .iter()
            .map(|s| {
                format!(
                    "[{} - {}] {}",
                    format_timestamp(s.start_seconds),
                    format_timestamp(s.end_seconds),
                    s.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_creation() {
        let segments = vec![
            Segment::new(0.0, 5.0, "Hello world"),
            Segment::new(5.0, 10.0, "This is a test"),
        ];

        let transcript = Transcript::new(segments);

        assert_eq!(transcript.text, "Hello world\nThis is a test");
        assert_eq!(transcript.duration_seconds(), 10.0);
        assert_eq!(transcript.word_count(), 6);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new(vec![]);
        assert_eq!(transcript.duration_seconds(), 0.0);
        assert!(transcript.text.is_empty());
    }

    #[test]
    fn test_blank_segments_excluded_from_text() {
        let segments = vec![
            Segment::new(0.0, 2.0, "First"),
            Segment::new(2.0, 3.0, "   "),
            Segment::new(3.0, 5.0, "Second"),
        ];

        let transcript = Transcript::new(segments);
        assert_eq!(transcript.text, "First\nSecond");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }
}
