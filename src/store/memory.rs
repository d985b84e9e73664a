//! In-memory chunk store for tests.

use super::{ChunkStore, IndexedChunk, IndexedVideo, ScoredChunk};
use crate::error::{Result, SkueError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Non-persistent store keyed by video name. Mirrors the SQLite backend's
/// behavior closely enough to stand in for it in tests.
#[derive(Default)]
pub struct MemoryChunkStore {
    videos: RwLock<HashMap<String, Vec<IndexedChunk>>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn upsert_batch(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let mut videos = self
            .videos
            .write()
            .map_err(|_| SkueError::ChunkStore("store lock poisoned".into()))?;
        for chunk in chunks {
            let entry = videos.entry(chunk.video_name.clone()).or_default();
            if let Some(existing) = entry.iter_mut().find(|c| c.chunk_id == chunk.chunk_id) {
                *existing = chunk;
            } else {
                entry.push(chunk);
            }
        }
        for entry in videos.values_mut() {
            entry.sort_by_key(|c| c.position);
        }
        Ok(())
    }

    async fn search_video(
        &self,
        video_name: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let chunks = self.get_by_video(video_name).await?;
        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| {
                let score = super::cosine_similarity(embedding, &chunk.embedding);
                ScoredChunk { chunk, score }
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_by_video(&self, video_name: &str) -> Result<Vec<IndexedChunk>> {
        let videos = self
            .videos
            .read()
            .map_err(|_| SkueError::ChunkStore("store lock poisoned".into()))?;
        Ok(videos.get(video_name).cloned().unwrap_or_default())
    }

    async fn delete_by_video(&self, video_name: &str) -> Result<()> {
        let mut videos = self
            .videos
            .write()
            .map_err(|_| SkueError::ChunkStore("store lock poisoned".into()))?;
        videos.remove(video_name);
        Ok(())
    }

    async fn is_indexed(&self, video_name: &str) -> Result<bool> {
        let videos = self
            .videos
            .read()
            .map_err(|_| SkueError::ChunkStore("store lock poisoned".into()))?;
        Ok(videos.get(video_name).is_some_and(|c| !c.is_empty()))
    }

    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let videos = self
            .videos
            .read()
            .map_err(|_| SkueError::ChunkStore("store lock poisoned".into()))?;
        let mut out: Vec<IndexedVideo> = videos
            .iter()
            .filter(|(_, chunks)| !chunks.is_empty())
            .map(|(name, chunks)| IndexedVideo {
                video_name: name.clone(),
                chunk_count: chunks.len() as i64,
                indexed_at: chunks
                    .iter()
                    .map(|c| c.indexed_at)
                    .max()
                    .unwrap_or_else(chrono::Utc::now),
            })
            .collect();
        out.sort_by(|a, b| a.video_name.cmp(&b.video_name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chunk(video: &str, id: &str, position: i64) -> IndexedChunk {
        IndexedChunk {
            chunk_id: id.to_string(),
            video_name: video.to_string(),
            text: format!("{id} text"),
            start_seconds: 0.0,
            end_seconds: 1.0,
            embedding: vec![1.0, 0.0],
            position,
            indexed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let store = MemoryChunkStore::new();
        store.upsert_batch(vec![chunk("v", "chunk-1", 0)]).await.unwrap();

        let mut updated = chunk("v", "chunk-1", 0);
        updated.text = "updated".into();
        store.upsert_batch(vec![updated]).await.unwrap();

        let chunks = store.get_by_video("v").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "updated");
    }

    #[tokio::test]
    async fn test_missing_video_is_empty() {
        let store = MemoryChunkStore::new();
        assert!(store.get_by_video("nope").await.unwrap().is_empty());
        assert!(!store.is_indexed("nope").await.unwrap());
    }
}
