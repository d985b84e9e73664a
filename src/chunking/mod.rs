//! Word-bounded transcript chunking.
//!
//! Groups segment text into overlapping, timestamp-annotated chunks that act
//! as the unit of retrieval. Segments are never split: a chunk closes only at
//! a segment boundary, so timestamp attribution always points at a real
//! segment. A configured number of trailing words is repeated at the head of
//! the next chunk so adjacent chunks share context.

use crate::error::{Result, SkueError};
use crate::transcription::{format_timestamp, Transcript};
use serde::{Deserialize, Serialize};

/// A word-bounded, timestamp-annotated grouping of segment text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk id, unique within one video ("chunk-1", "chunk-2", ...).
    pub id: String,
    /// Whitespace-joined text of the contributing segments.
    pub text: String,
    /// Start of the first contributing segment, in seconds.
    pub start_seconds: f64,
    /// End of the last contributing segment, in seconds.
    pub end_seconds: f64,
}

impl Chunk {
    /// Duration of this chunk in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Format the start timestamp for display.
    pub fn format_timestamp(&self) -> String {
        format_timestamp(self.start_seconds)
    }
}

/// Parameters for word-bounded chunking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingParams {
    /// Maximum words per chunk. A single segment longer than this is
    /// emitted whole rather than split.
    pub max_words: usize,
    /// Trailing words of a chunk repeated at the head of the next one.
    pub overlap_words: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            max_words: 200,
            overlap_words: 40,
        }
    }
}

impl ChunkingParams {
    /// Reject parameter combinations that could never converge.
    pub fn validate(&self) -> Result<()> {
        if self.max_words == 0 {
            return Err(SkueError::Config("max_words must be at least 1".into()));
        }
        if self.overlap_words >= self.max_words {
            return Err(SkueError::Config(format!(
                "overlap_words ({}) must be smaller than max_words ({})",
                self.overlap_words, self.max_words
            )));
        }
        Ok(())
    }
}

/// A buffered word with the timestamps of the segment it came from.
///
/// Overlap is carried word-by-word, but the timestamps stay segment-granular:
/// the start of a post-overlap chunk is the start of the segment containing
/// its first carried word, an approximation rather than a word-exact boundary.
#[derive(Debug, Clone)]
struct BufferedWord {
    word: String,
    segment_start: f64,
    segment_end: f64,
}

/// Split a transcript into overlapping word-bounded chunks.
///
/// Segments are walked in emitted order; overlapping or out-of-order input is
/// accepted as-is. An empty transcript yields an empty chunk sequence.
pub fn chunk_transcript(transcript: &Transcript, params: &ChunkingParams) -> Result<Vec<Chunk>> {
    params.validate()?;

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer: Vec<BufferedWord> = Vec::new();
    let mut next_id = 1usize;

    for segment in &transcript.segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        let words: Vec<&str> = text.split_whitespace().collect();

        // Close the running chunk before this segment would overflow it.
        if !buffer.is_empty() && buffer.len() + words.len() > params.max_words {
            chunks.push(close_chunk(&buffer, &mut next_id));

            if params.overlap_words > 0 {
                let keep_from = buffer.len().saturating_sub(params.overlap_words);
                buffer.drain(..keep_from);
            } else {
                buffer.clear();
            }
        }

        for word in words {
            buffer.push(BufferedWord {
                word: word.to_string(),
                segment_start: segment.start_seconds,
                segment_end: segment.end_seconds,
            });
        }
    }

    // The final partial buffer becomes the last chunk regardless of size.
    if !buffer.is_empty() {
        chunks.push(close_chunk(&buffer, &mut next_id));
    }

    Ok(chunks)
}

fn close_chunk(buffer: &[BufferedWord], next_id: &mut usize) -> Chunk {
    let start_seconds = buffer.first().map(|w| w.segment_start).unwrap_or(0.0);
    let end_seconds = buffer.last().map(|w| w.segment_end).unwrap_or(0.0);
    let text = buffer
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let chunk = Chunk {
        id: format!("chunk-{}", next_id),
        text,
        start_seconds,
        end_seconds,
    };
    *next_id += 1;
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::Segment;

    fn transcript(segments: Vec<(f64, f64, &str)>) -> Transcript {
        Transcript::new(
            segments
                .into_iter()
                .map(|(s, e, t)| Segment::new(s, e, t))
                .collect(),
        )
    }

    #[test]
    fn test_three_segment_scenario() {
        let t = transcript(vec![
            (0.0, 5.0, "hello world"),
            (5.0, 12.0, "this is a test"),
            (12.0, 20.0, "of chunking logic"),
        ]);

        let params = ChunkingParams {
            max_words: 6,
            overlap_words: 2,
        };
        let chunks = chunk_transcript(&t, &params).unwrap();

        assert_eq!(chunks.len(), 2);

        assert_eq!(chunks[0].id, "chunk-1");
        assert_eq!(chunks[0].text, "hello world this is a test");
        assert_eq!(chunks[0].start_seconds, 0.0);
        assert_eq!(chunks[0].end_seconds, 12.0);

        // Second chunk opens with the carried words; its start comes from
        // the segment that contained the first carried word.
        assert_eq!(chunks[1].id, "chunk-2");
        assert_eq!(chunks[1].text, "a test of chunking logic");
        assert_eq!(chunks[1].start_seconds, 5.0);
        assert_eq!(chunks[1].end_seconds, 20.0);
    }

    #[test]
    fn test_empty_transcript() {
        let t = transcript(vec![]);
        let chunks = chunk_transcript(&t, &ChunkingParams::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_whitespace_segments_skipped() {
        let t = transcript(vec![(0.0, 1.0, "  "), (1.0, 2.0, "words here")]);
        let chunks = chunk_transcript(&t, &ChunkingParams::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_seconds, 1.0);
    }

    #[test]
    fn test_oversized_segment_emitted_whole() {
        let long_text = vec!["word"; 50].join(" ");
        let t = transcript(vec![(0.0, 30.0, long_text.as_str()), (30.0, 35.0, "tail bit")]);

        let params = ChunkingParams {
            max_words: 10,
            overlap_words: 2,
        };
        let chunks = chunk_transcript(&t, &params).unwrap();

        // First segment was never split mid-segment.
        assert_eq!(chunks[0].text.split_whitespace().count(), 50);
        assert_eq!(chunks[0].start_seconds, 0.0);
        assert_eq!(chunks[0].end_seconds, 30.0);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_max() {
        let t = transcript(vec![(0.0, 1.0, "a b c")]);
        let params = ChunkingParams {
            max_words: 10,
            overlap_words: 10,
        };
        assert!(matches!(
            chunk_transcript(&t, &params),
            Err(SkueError::Config(_))
        ));
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let t = transcript(vec![
            (0.0, 5.0, "one two three four"),
            (5.0, 10.0, "five six seven eight"),
            (10.0, 15.0, "nine ten eleven twelve"),
        ]);
        let params = ChunkingParams {
            max_words: 6,
            overlap_words: 2,
        };

        let first = chunk_transcript(&t, &params).unwrap();
        let second = chunk_transcript(&t, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunk_starts_are_real_segment_starts() {
        let t = transcript(vec![
            (0.0, 4.0, "alpha beta gamma"),
            (4.0, 8.0, "delta epsilon zeta"),
            (8.0, 12.0, "eta theta iota"),
            (12.0, 16.0, "kappa lambda mu"),
        ]);
        let params = ChunkingParams {
            max_words: 5,
            overlap_words: 1,
        };

        let chunks = chunk_transcript(&t, &params).unwrap();
        let segment_starts = [0.0, 4.0, 8.0, 12.0];

        for chunk in &chunks {
            assert!(chunk.start_seconds <= chunk.end_seconds);
            assert!(segment_starts.contains(&chunk.start_seconds));
        }
    }

    #[test]
    fn test_reconstruction_without_overlap() {
        let t = transcript(vec![
            (0.0, 5.0, "one two three"),
            (5.0, 10.0, "four five six"),
            (10.0, 15.0, "seven eight nine"),
        ]);
        let params = ChunkingParams {
            max_words: 4,
            overlap_words: 0,
        };

        let chunks = chunk_transcript(&t, &params).unwrap();
        let rebuilt = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, "one two three four five six seven eight nine");
    }

    #[test]
    fn test_overlapping_segments_do_not_crash() {
        // Deliberately overlapping caption spans; behavior is pass-through.
        let t = transcript(vec![
            (0.0, 6.0, "overlapping span one"),
            (4.0, 9.0, "overlapping span two"),
            (8.0, 14.0, "overlapping span three"),
        ]);
        let params = ChunkingParams {
            max_words: 5,
            overlap_words: 1,
        };

        let chunks = chunk_transcript(&t, &params).unwrap();
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.start_seconds <= chunk.end_seconds);
        }
    }
}
