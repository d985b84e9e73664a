//! Error types for Skue.

use thiserror::Error;

/// Library-level error type for Skue operations.
#[derive(Error, Debug)]
pub enum SkueError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download failed ({strategies}): {message}")]
    Acquisition { strategies: String, message: String },

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Chunk store error: {0}")]
    ChunkStore(String),

    #[error("No index for '{0}'. Build one first with 'skue index build'.")]
    NotIndexed(String),

    #[error("Index build failed for '{video}': {message}")]
    IndexBuild { video: String, message: String },

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Skue operations.
pub type Result<T> = std::result::Result<T, SkueError>;
