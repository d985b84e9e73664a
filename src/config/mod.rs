//! Configuration loading and management.

mod settings;

pub use settings::{
    ChunkingSettings, DownloadSettings, EmbeddingSettings, GeneralSettings, LlmSettings,
    RetrievalSettings, Settings, StorageSettings, TranscriptionSettings,
};
