//! Persistent chunk and transcript storage.
//!
//! The chunk store keeps embedded transcript chunks scoped per video so an
//! index can be built, queried, and deleted independently of every other
//! video's index. SQLite is the production backend; an in-memory store backs
//! tests that should not touch disk.

mod memory;
mod sqlite;

pub use memory::MemoryChunkStore;
pub use sqlite::SqliteChunkStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk as it lives in the store: text, span, embedding, and position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Chunk id, unique within one video ("chunk-1", ...).
    pub chunk_id: String,
    /// The video this chunk was indexed under.
    pub video_name: String,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Embedding vector; empty when the index was built without embeddings.
    pub embedding: Vec<f32>,
    /// Ordinal of the chunk within its video, starting at 0.
    pub position: i64,
    pub indexed_at: DateTime<Utc>,
}

/// Summary row for one indexed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVideo {
    pub video_name: String,
    pub chunk_count: i64,
    pub indexed_at: DateTime<Utc>,
}

/// A chunk returned from a similarity search, with its score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: IndexedChunk,
    pub score: f32,
}

/// Storage backend for per-video chunk indexes.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or replace a batch of chunks for one video.
    async fn upsert_batch(&self, chunks: Vec<IndexedChunk>) -> Result<()>;

    /// Cosine-similarity search over one video's chunks.
    async fn search_video(
        &self,
        video_name: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// All chunks for one video in position order.
    async fn get_by_video(&self, video_name: &str) -> Result<Vec<IndexedChunk>>;

    /// Remove every chunk for one video. Removing a missing video is a no-op.
    async fn delete_by_video(&self, video_name: &str) -> Result<()>;

    /// Whether any chunks exist for this video.
    async fn is_indexed(&self, video_name: &str) -> Result<bool>;

    /// All indexed videos with their chunk counts, sorted by name.
    async fn list_videos(&self) -> Result<Vec<IndexedVideo>>;
}

/// Cosine similarity between two vectors. Returns 0.0 when either vector is
/// empty, zero, or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
