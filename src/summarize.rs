//! Transcript summarization in several styles.

use crate::error::{Result, SkueError};
use crate::llm::LanguageModel;
use crate::transcription::Transcript;
use std::str::FromStr;
use tracing::{info, instrument};

/// How the summary should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    /// Thorough prose covering the whole video.
    #[default]
    Comprehensive,
    /// A few sentences.
    Brief,
    /// One or two sentences.
    Tldr,
    /// Bulleted list of the main points.
    KeyPoints,
}

impl FromStr for SummaryStyle {
    type Err = SkueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "comprehensive" | "full" => Ok(Self::Comprehensive),
            "brief" | "short" => Ok(Self::Brief),
            "tldr" | "tl;dr" => Ok(Self::Tldr),
            "key-points" | "keypoints" | "bullets" => Ok(Self::KeyPoints),
            other => Err(SkueError::InvalidInput(format!(
                "unknown summary style '{other}' (expected comprehensive, brief, tldr, or key-points)"
            ))),
        }
    }
}

impl SummaryStyle {
    fn instruction(&self) -> &'static str {
        match self {
            Self::Comprehensive => {
                "Write a comprehensive summary covering every major topic, \
argument, and conclusion in order."
            }
            Self::Brief => "Write a brief summary in three to five sentences.",
            Self::Tldr => "Write a one or two sentence TL;DR.",
            Self::KeyPoints => "List the key points as concise bullet points.",
        }
    }
}

/// Summarize a transcript with the given model and style.
#[instrument(skip(model, transcript), fields(style = ?style))]
pub async fn summarize(
    model: &dyn LanguageModel,
    video_name: &str,
    transcript: &Transcript,
    style: SummaryStyle,
) -> Result<String> {
    if transcript.text.trim().is_empty() {
        return Err(SkueError::InvalidInput(format!(
            "transcript for '{video_name}' is empty"
        )));
    }

    info!(video = video_name, "summarizing transcript");

    let prompt = format!(
        "{}\n\nThe transcript of the video '{}' follows:\n\n{}\n\nSummary:",
        style.instruction(),
        video_name,
        transcript.text
    );

    model.generate(&prompt).await
}
