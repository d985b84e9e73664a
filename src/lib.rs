//! Skue - Local Video Intelligence
//!
//! A local-first CLI tool for downloading videos, transcribing speech, and
//! building a searchable, timestamp-aware knowledge base on top of the
//! transcripts.
//!
//! The name "Skue" comes from the Norwegian word for "behold" or "watch."
//!
//! # Overview
//!
//! Skue allows you to:
//! - Download YouTube videos and extract normalized audio
//! - Transcribe speech locally with timestamped segments
//! - Chunk and index transcripts for semantic search
//! - Ask questions and get answers with timestamp citations
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `acquire` - Video download with fallback strategies
//! - `audio` - Audio extraction and normalization
//! - `transcription` - Speech-to-text adapter and transcript model
//! - `chunking` - Word-bounded transcript chunking
//! - `embedding` - Embedding generation
//! - `store` - Chunk/embedding persistence
//! - `index` - Per-video index lifecycle
//! - `retrieval` - Keyword and vector retrieval strategies
//! - `llm` - Local language-model port
//! - `qa` - Question answering with citations
//! - `pipeline` - End-to-end coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use skue::config::Settings;
//! use skue::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::from_settings(settings)?;
//!
//!     // Download, transcribe, and index a video
//!     let result = pipeline.process_url("https://youtu.be/dQw4w9WgXcQ", false).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod library;
pub mod llm;
pub mod pipeline;
pub mod qa;
pub mod retrieval;
pub mod retry;
pub mod store;
pub mod summarize;
pub mod transcription;

pub use error::{Result, SkueError};
