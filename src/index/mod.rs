//! Per-video index lifecycle: build, query, list, delete.
//!
//! An index is the set of embedded chunks stored for one video. Queries pick
//! a retrieval strategy at call time: vector similarity when the index holds
//! embeddings and an embedder is wired in, keyword overlap otherwise.

use crate::chunking::{chunk_transcript, ChunkingParams};
use crate::embedding::Embedder;
use crate::error::{Result, SkueError};
use crate::retrieval::{keyword_search, RetrievedChunk, VectorRetriever};
use crate::store::{ChunkStore, IndexedChunk, IndexedVideo};
use crate::transcription::Transcript;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a batch build: which videos indexed, which were already
/// indexed and skipped, and which failed, with the failure detail. One bad
/// video never aborts the rest.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }
}

/// Owns the build/query/delete lifecycle of per-video chunk indexes.
pub struct IndexManager {
    store: Arc<dyn ChunkStore>,
    embedder: Option<Arc<dyn Embedder>>,
    params: ChunkingParams,
}

impl IndexManager {
    pub fn new(
        store: Arc<dyn ChunkStore>,
        embedder: Option<Arc<dyn Embedder>>,
        params: ChunkingParams,
    ) -> Self {
        Self {
            store,
            embedder,
            params,
        }
    }

    /// Chunk, embed, and store a video's transcript. Fails if an index
    /// already exists unless `force` is set. Returns the chunk count.
    pub async fn build(
        &self,
        video_name: &str,
        transcript: &Transcript,
        force: bool,
    ) -> Result<usize> {
        if self.store.is_indexed(video_name).await? {
            if !force {
                return Err(SkueError::IndexBuild {
                    video: video_name.to_string(),
                    message: "index already exists (use --force to rebuild)".to_string(),
                });
            }
            self.store.delete_by_video(video_name).await?;
        }

        let chunks = chunk_transcript(transcript, &self.params)?;
        if chunks.is_empty() {
            return Err(SkueError::IndexBuild {
                video: video_name.to_string(),
                message: "transcript produced no chunks".to_string(),
            });
        }

        let embeddings = match &self.embedder {
            Some(embedder) => {
                let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
                embedder.embed_batch(&texts).await?
            }
            None => {
                warn!(video = video_name, "no embedder configured, building keyword-only index");
                vec![Vec::new(); chunks.len()]
            }
        };

        let now = Utc::now();
        let indexed: Vec<IndexedChunk> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (chunk, embedding))| IndexedChunk {
                chunk_id: chunk.id.clone(),
                video_name: video_name.to_string(),
                text: chunk.text.clone(),
                start_seconds: chunk.start_seconds,
                end_seconds: chunk.end_seconds,
                embedding,
                position: position as i64,
                indexed_at: now,
            })
            .collect();

        let count = indexed.len();
        self.store.upsert_batch(indexed).await?;
        info!(video = video_name, chunks = count, "index built");
        Ok(count)
    }

    /// Delete and rebuild a video's index.
    pub async fn rebuild(&self, video_name: &str, transcript: &Transcript) -> Result<usize> {
        self.build(video_name, transcript, true).await
    }

    /// Retrieve the most relevant chunks for a query against one video.
    ///
    /// Errors with [`SkueError::NotIndexed`] if the video has no index.
    pub async fn query(
        &self,
        video_name: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if !self.store.is_indexed(video_name).await? {
            return Err(SkueError::NotIndexed(video_name.to_string()));
        }

        let chunks = self.store.get_by_video(video_name).await?;
        let has_embeddings = chunks.iter().any(|c| !c.embedding.is_empty());

        match (&self.embedder, has_embeddings) {
            (Some(embedder), true) => {
                let retriever = VectorRetriever::new(self.store.clone(), embedder.clone());
                retriever.retrieve(video_name, query, limit).await
            }
            _ => Ok(keyword_search(&chunks, query, limit)),
        }
    }

    pub async fn is_indexed(&self, video_name: &str) -> Result<bool> {
        self.store.is_indexed(video_name).await
    }

    pub async fn list_indexed(&self) -> Result<Vec<IndexedVideo>> {
        self.store.list_videos().await
    }

    /// Remove a video's index. Removing a missing index succeeds quietly.
    pub async fn delete(&self, video_name: &str) -> Result<()> {
        self.store.delete_by_video(video_name).await?;
        info!(video = video_name, "index deleted");
        Ok(())
    }

    /// Build indexes for many videos, isolating failures per video.
    /// Already-indexed videos are skipped unless `force` is set.
    pub async fn batch_build(
        &self,
        videos: &[(String, Transcript)],
        force: bool,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for (video_name, transcript) in videos {
            if !force && self.store.is_indexed(video_name).await? {
                info!(video = video_name.as_str(), "already indexed, skipping");
                report.skipped.push(video_name.clone());
                continue;
            }
            match self.build(video_name, transcript, force).await {
                Ok(_) => report.succeeded.push(video_name.clone()),
                Err(e) => {
                    warn!(video = video_name.as_str(), error = %e, "batch build failure");
                    report.failed.push((video_name.clone(), e.to_string()));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::store::MemoryChunkStore;
    use crate::transcription::Segment;
    use async_trait::async_trait;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Length-based toy embedding, deterministic.
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn transcript(text: &str) -> Transcript {
        Transcript::new(vec![Segment::new(0.0, 10.0, text)])
    }

    fn manager(embedder: Option<Arc<dyn Embedder>>) -> IndexManager {
        IndexManager::new(
            Arc::new(MemoryChunkStore::new()),
            embedder,
            ChunkingParams::default(),
        )
    }

    #[tokio::test]
    async fn test_build_and_query() {
        let mgr = manager(Some(Arc::new(StubEmbedder)));
        let count = mgr
            .build("talk", &transcript("ownership and borrowing"), false)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(mgr.is_indexed("talk").await.unwrap());

        let results = mgr.query("talk", "ownership", 4).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_build_refuses_existing_without_force() {
        let mgr = manager(None);
        mgr.build("talk", &transcript("some words"), false).await.unwrap();

        let err = mgr
            .build("talk", &transcript("other words"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SkueError::IndexBuild { .. }));

        // Force replaces the index.
        mgr.build("talk", &transcript("other words"), true).await.unwrap();
        let chunks = mgr.query("talk", "other", 4).await.unwrap();
        assert!(chunks[0].text.contains("other"));
    }

    #[tokio::test]
    async fn test_query_unindexed_video() {
        let mgr = manager(None);
        let err = mgr.query("ghost", "anything", 4).await.unwrap_err();
        assert!(matches!(err, SkueError::NotIndexed(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_keyword_fallback_without_embedder() {
        let mgr = manager(None);
        mgr.build("talk", &transcript("keyword only index"), false)
            .await
            .unwrap();

        let results = mgr.query("talk", "keyword", 4).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_empty_transcript_fails_build() {
        let mgr = manager(None);
        let err = mgr
            .build("talk", &Transcript::new(vec![]), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SkueError::IndexBuild { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let mgr = manager(None);
        mgr.build("talk", &transcript("words"), false).await.unwrap();
        mgr.delete("talk").await.unwrap();
        assert!(!mgr.is_indexed("talk").await.unwrap());
        mgr.delete("talk").await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_build_isolates_failures() {
        let mgr = manager(None);
        let videos = vec![
            ("good".to_string(), transcript("usable words")),
            ("empty".to_string(), Transcript::new(vec![])),
            ("also-good".to_string(), transcript("more words")),
        ];

        let report = mgr.batch_build(&videos, false).await.unwrap();
        assert_eq!(report.succeeded, vec!["good", "also-good"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "empty");
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn test_batch_rerun_skips_indexed_videos() {
        let mgr = manager(None);
        let videos = vec![
            ("talk".to_string(), transcript("usable words")),
            ("lecture".to_string(), transcript("more words")),
        ];

        let first = mgr.batch_build(&videos, false).await.unwrap();
        assert_eq!(first.succeeded.len(), 2);

        // A second pass is a clean no-op, not a pile of failures.
        let second = mgr.batch_build(&videos, false).await.unwrap();
        assert!(second.succeeded.is_empty());
        assert!(second.failed.is_empty());
        assert_eq!(second.skipped, vec!["talk", "lecture"]);

        // Forcing reindexes everything.
        let forced = mgr.batch_build(&videos, true).await.unwrap();
        assert_eq!(forced.succeeded.len(), 2);
        assert!(forced.skipped.is_empty());
    }
}
