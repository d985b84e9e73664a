//! End-to-end processing pipeline.
//!
//! Drives one video from URL to queryable index: download, audio
//! extraction, transcription, transcript persistence, then chunking,
//! embedding, and index build. Each stage hands its artifact to the next by
//! the shared filename stem.

use crate::acquire::VideoAcquirer;
use crate::audio::AudioExtractor;
use crate::chunking::ChunkingParams;
use crate::config::Settings;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::error::{Result, SkueError};
use crate::index::IndexManager;
use crate::store::SqliteChunkStore;
use crate::transcription::{
    save_transcript, SpeechEngine, TranscriptionOptions, WhisperEngine,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of processing one video end to end.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub video_name: String,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub chunks_indexed: usize,
}

/// Wires the pipeline stages together from settings.
pub struct Pipeline {
    settings: Settings,
    acquirer: VideoAcquirer,
    extractor: AudioExtractor,
    engine: Box<dyn SpeechEngine>,
    index: Arc<IndexManager>,
    store: Arc<SqliteChunkStore>,
}

impl Pipeline {
    /// Build a pipeline from settings, opening the chunk store on disk.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let store = Arc::new(SqliteChunkStore::open(&settings.sqlite_path())?);

        let embedder: Option<Arc<dyn Embedder>> = if settings.embedding.enabled {
            Some(Arc::new(
                OllamaEmbedder::with_config(
                    &settings.embedding.model,
                    settings.embedding.dimensions as usize,
                )
                .with_host(&settings.embedding.host),
            ))
        } else {
            None
        };

        let params = ChunkingParams {
            max_words: settings.chunking.max_words,
            overlap_words: settings.chunking.overlap_words,
        };
        params.validate()?;

        let index = Arc::new(IndexManager::new(store.clone(), embedder, params));

        Ok(Self {
            acquirer: VideoAcquirer::new(&settings.videos_dir()),
            extractor: AudioExtractor::new(&settings.audio_dir())
                .with_fallback_binary(settings.download.ffmpeg_fallback.clone()),
            engine: Box::new(WhisperEngine::new()),
            index: index.clone(),
            store,
            settings,
        })
    }

    /// Swap in a different speech engine.
    pub fn with_engine(mut self, engine: Box<dyn SpeechEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn index_manager(&self) -> Arc<IndexManager> {
        self.index.clone()
    }

    pub fn store(&self) -> Arc<SqliteChunkStore> {
        self.store.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the whole pipeline for one URL.
    #[instrument(skip(self))]
    pub async fn process_url(&self, url: &str, force: bool) -> Result<ProcessResult> {
        let video_path = self.acquirer.acquire(url).await?;
        self.process_file(&video_path, force).await
    }

    /// Run the pipeline for a video file already on disk.
    #[instrument(skip(self))]
    pub async fn process_file(&self, video_path: &Path, force: bool) -> Result<ProcessResult> {
        let video_name = video_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                SkueError::InvalidInput(format!(
                    "video path has no usable file stem: {}",
                    video_path.display()
                ))
            })?
            .to_string();

        info!(video = video_name.as_str(), "processing video");

        let audio_path = self.extractor.extract(video_path).await?;

        let options = self.transcription_options()?;
        let mut transcript = self.engine.transcribe(&audio_path, &options).await?;

        let transcript_path = save_transcript(
            &mut transcript,
            &video_name,
            &self.settings.transcripts_dir(),
        )?;
        self.store.store_transcript(&video_name, &transcript)?;

        let chunks_indexed = self.index.build(&video_name, &transcript, force).await?;

        info!(
            video = video_name.as_str(),
            chunks = chunks_indexed,
            "pipeline complete"
        );

        Ok(ProcessResult {
            video_name,
            video_path: video_path.to_path_buf(),
            audio_path,
            transcript_path,
            chunks_indexed,
        })
    }

    /// Translate transcription settings into engine options.
    pub fn transcription_options(&self) -> Result<TranscriptionOptions> {
        let t = &self.settings.transcription;
        Ok(TranscriptionOptions {
            model_size: t.model_size.parse().map_err(SkueError::Config)?,
            device: t.device.parse().map_err(SkueError::Config)?,
            compute_type: t.compute_type.clone(),
            beam_size: t.beam_size,
            // "auto" means let the engine detect the language
            language: t.language.clone().filter(|l| l != "auto"),
            vad_filter: t.vad_filter,
            word_timestamps: false,
        })
    }
}
