//! Vector-similarity retrieval.

use super::RetrievedChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::ChunkStore;
use std::sync::Arc;
use tracing::debug;

/// Retrieves chunks by cosine similarity between the embedded query and the
/// embeddings stored at index time.
pub struct VectorRetriever {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    pub fn new(store: Arc<dyn ChunkStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Embed the query and return the most similar chunks for one video.
    pub async fn retrieve(
        &self,
        video_name: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(query).await?;
        let hits = self
            .store
            .search_video(video_name, &query_embedding, limit)
            .await?;

        debug!(video = video_name, hits = hits.len(), "vector retrieval");

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                chunk_id: hit.chunk.chunk_id,
                video_name: hit.chunk.video_name,
                text: hit.chunk.text,
                start_seconds: hit.chunk.start_seconds,
                end_seconds: hit.chunk.end_seconds,
                score: hit.score,
            })
            .collect())
    }
}
