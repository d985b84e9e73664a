//! SQLite-backed chunk store.

use super::{ChunkStore, IndexedChunk, IndexedVideo, ScoredChunk};
use crate::error::{Result, SkueError};
use crate::transcription::Transcript;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Chunk and transcript persistence in a single SQLite file.
///
/// The connection is wrapped in a mutex; all operations are short-lived, so
/// serializing them is acceptable for a local single-user tool.
pub struct SqliteChunkStore {
    conn: Mutex<Connection>,
}

impl SqliteChunkStore {
    /// Open (and migrate) a store at the given path. Parent directories are
    /// created as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked during batch upserts
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Used in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chunks (
                video_name    TEXT NOT NULL,
                chunk_id      TEXT NOT NULL,
                text          TEXT NOT NULL,
                start_seconds REAL NOT NULL,
                end_seconds   REAL NOT NULL,
                embedding     BLOB NOT NULL,
                position      INTEGER NOT NULL,
                indexed_at    TEXT NOT NULL,
                PRIMARY KEY (video_name, chunk_id)
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_video ON chunks(video_name);

            CREATE TABLE IF NOT EXISTS transcripts (
                video_name TEXT PRIMARY KEY,
                transcript TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SkueError::ChunkStore("store mutex poisoned".into()))
    }

    /// Persist the full transcript for a video, replacing any previous one.
    pub fn store_transcript(&self, video_name: &str, transcript: &Transcript) -> Result<()> {
        let json = serde_json::to_string(transcript)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO transcripts (video_name, transcript, created_at)
             VALUES (?1, ?2, ?3)",
            params![video_name, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load a stored transcript, or `None` if the video has none.
    pub fn get_transcript(&self, video_name: &str) -> Result<Option<Transcript>> {
        let conn = self.lock()?;
        let row: std::result::Result<String, rusqlite::Error> = conn.query_row(
            "SELECT transcript FROM transcripts WHERE video_name = ?1",
            params![video_name],
            |row| row.get(0),
        );
        match row {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all videos that have a stored transcript, sorted.
    pub fn list_transcripts(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT video_name FROM transcripts ORDER BY video_name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Remove the stored transcript for a video, if any.
    pub fn delete_transcript(&self, video_name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM transcripts WHERE video_name = ?1",
            params![video_name],
        )?;
        Ok(())
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexedChunk> {
    let embedding: Vec<u8> = row.get(5)?;
    let indexed_at: String = row.get(7)?;
    Ok(IndexedChunk {
        video_name: row.get(0)?,
        chunk_id: row.get(1)?,
        text: row.get(2)?,
        start_seconds: row.get(3)?,
        end_seconds: row.get(4)?,
        embedding: bytes_to_embedding(&embedding),
        position: row.get(6)?,
        indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const CHUNK_COLUMNS: &str =
    "video_name, chunk_id, text, start_seconds, end_seconds, embedding, position, indexed_at";

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn upsert_batch(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO chunks
                 (video_name, chunk_id, text, start_seconds, end_seconds, embedding, position, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for chunk in &chunks {
                stmt.execute(params![
                    chunk.video_name,
                    chunk.chunk_id,
                    chunk.text,
                    chunk.start_seconds,
                    chunk.end_seconds,
                    embedding_to_bytes(&chunk.embedding),
                    chunk.position,
                    chunk.indexed_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn search_video(
        &self,
        video_name: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        // Brute-force scan of one video's chunks; local corpora are small
        // enough that this stays well under a millisecond.
        let all = self.get_by_video(video_name).await?;
        let mut scored: Vec<ScoredChunk> = all
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
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHUNK_COLUMNS} FROM chunks WHERE video_name = ?1 ORDER BY position"
        ))?;
        let chunks = stmt
            .query_map(params![video_name], row_to_chunk)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(chunks)
    }

    async fn delete_by_video(&self, video_name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM chunks WHERE video_name = ?1", params![video_name])?;
        Ok(())
    }

    async fn is_indexed(&self, video_name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE video_name = ?1",
            params![video_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT video_name, COUNT(*), MAX(indexed_at)
             FROM chunks GROUP BY video_name ORDER BY video_name",
        )?;
        let videos = stmt
            .query_map([], |row| {
                let indexed_at: String = row.get(2)?;
                Ok(IndexedVideo {
                    video_name: row.get(0)?,
                    chunk_count: row.get(1)?,
                    indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::Segment;

    fn sample_chunk(video: &str, id: &str, position: i64, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk_id: id.to_string(),
            video_name: video.to_string(),
            text: format!("text for {id}"),
            start_seconds: position as f64 * 10.0,
            end_seconds: position as f64 * 10.0 + 10.0,
            embedding,
            position,
            indexed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_by_video() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        store
            .upsert_batch(vec![
                sample_chunk("talk", "chunk-2", 1, vec![0.0, 1.0]),
                sample_chunk("talk", "chunk-1", 0, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let chunks = store.get_by_video("talk").await.unwrap();
        assert_eq!(chunks.len(), 2);
        // Position order, not insertion order.
        assert_eq!(chunks[0].chunk_id, "chunk-1");
        assert_eq!(chunks[1].chunk_id, "chunk-2");
        assert_eq!(chunks[0].embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_search_is_scoped_per_video() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        store
            .upsert_batch(vec![
                sample_chunk("a", "chunk-1", 0, vec![1.0, 0.0]),
                sample_chunk("b", "chunk-1", 0, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search_video("a", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.video_name, "a");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        store
            .upsert_batch(vec![
                sample_chunk("talk", "chunk-1", 0, vec![0.0, 1.0]),
                sample_chunk("talk", "chunk-2", 1, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search_video("talk", &[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits[0].chunk.chunk_id, "chunk-2");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        store
            .upsert_batch(vec![sample_chunk("talk", "chunk-1", 0, vec![1.0])])
            .await
            .unwrap();

        store.delete_by_video("talk").await.unwrap();
        assert!(!store.is_indexed("talk").await.unwrap());

        // Deleting again succeeds quietly.
        store.delete_by_video("talk").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_videos() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        store
            .upsert_batch(vec![
                sample_chunk("b", "chunk-1", 0, vec![1.0]),
                sample_chunk("a", "chunk-1", 0, vec![1.0]),
                sample_chunk("a", "chunk-2", 1, vec![1.0]),
            ])
            .await
            .unwrap();

        let videos = store.list_videos().await.unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_name, "a");
        assert_eq!(videos[0].chunk_count, 2);
        assert_eq!(videos[1].video_name, "b");
    }

    #[tokio::test]
    async fn test_transcript_round_trip() {
        let store = SqliteChunkStore::open_in_memory().unwrap();
        let transcript = Transcript::new(vec![Segment::new(0.0, 5.0, "hello there")]);

        store.store_transcript("talk", &transcript).unwrap();
        let loaded = store.get_transcript("talk").unwrap().unwrap();
        assert_eq!(loaded.text, "hello there");

        assert!(store.get_transcript("missing").unwrap().is_none());
        assert_eq!(store.list_transcripts().unwrap(), vec!["talk"]);
    }
}
