//! Retrieval strategies over a video's indexed chunks.
//!
//! Two strategies exist: keyword overlap scoring, which works on raw chunk
//! text with no model dependency, and vector similarity, which needs an
//! embedder and embeddings stored at index time. Callers pick the strategy
//! once per query based on what the index contains.

mod keyword;
mod vector;

pub use keyword::keyword_search;
pub use vector::VectorRetriever;

use crate::transcription::format_timestamp;
use serde::{Deserialize, Serialize};

/// A chunk returned by a retrieval strategy, with provenance and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub video_name: String,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Strategy-specific relevance score. Comparable within one result set
    /// only, not across strategies.
    pub score: f32,
}

impl RetrievedChunk {
    /// Time span of this chunk formatted for citations, e.g. "01:23-02:05".
    pub fn time_span(&self) -> String {
        format!(
            "{}-{}",
            format_timestamp(self.start_seconds),
            format_timestamp(self.end_seconds)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_span_format() {
        let chunk = RetrievedChunk {
            chunk_id: "chunk-1".into(),
            video_name: "talk".into(),
            text: "text".into(),
            start_seconds: 83.0,
            end_seconds: 125.0,
            score: 0.5,
        };
        assert_eq!(chunk.time_span(), "01:23-02:05");
    }
}
