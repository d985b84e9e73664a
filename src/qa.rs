//! Question answering over one video's index.
//!
//! Retrieval supplies the context, the language model writes the answer.
//! Context blocks carry numbered time-span citations so the model can point
//! back at the transcript, and the cited chunks travel with the answer for
//! display.

use crate::error::Result;
use crate::index::IndexManager;
use crate::llm::LanguageModel;
use crate::retrieval::RetrievedChunk;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DEFAULT_TOP_K: usize = 4;

/// Answers questions about an indexed video.
pub struct QaEngine {
    index: Arc<IndexManager>,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
}

impl QaEngine {
    pub fn new(index: Arc<IndexManager>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            index,
            model,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many chunks feed the answer context.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Retrieve context for `question` against `video_name` and generate a
    /// cited answer.
    #[instrument(skip(self), fields(video = %video_name))]
    pub async fn ask(&self, video_name: &str, question: &str) -> Result<QaResponse> {
        info!("answering question");

        let sources = self.index.query(video_name, question, self.top_k).await?;
        let prompt = build_prompt(video_name, question, &sources);

        debug!(sources = sources.len(), "generating answer");
        let answer = self.model.generate(&prompt).await?;

        Ok(QaResponse { answer, sources })
    }
}

/// Numbered context blocks with time spans, followed by the question.
fn build_prompt(video_name: &str, question: &str, sources: &[RetrievedChunk]) -> String {
    let context = sources
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{} {}]\n{}", i + 1, chunk.time_span(), chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are answering questions about the video '{video_name}' using only \
the transcript excerpts below. Each excerpt is labeled [n MM:SS-MM:SS]. \
Cite the labels of the excerpts you draw on. If the excerpts do not \
contain the answer, say so.\n\n{context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

/// An answer plus the chunks it was grounded in.
#[derive(Debug, Clone)]
pub struct QaResponse {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
}

impl QaResponse {
    /// Format the answer and its sources for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for (i, source) in self.sources.iter().enumerate() {
                output.push_str(&format!(
                    "\n[{} {}] score {:.2}",
                    i + 1,
                    source.time_span(),
                    source.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingParams;
    use crate::store::MemoryChunkStore;
    use crate::transcription::{Segment, Transcript};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Model stub that records the prompt it was given.
    struct RecordingModel {
        last_prompt: Mutex<String>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            Ok("The talk covers ownership [1 00:00-00:10].".to_string())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    async fn engine_with_index() -> (QaEngine, Arc<RecordingModel>) {
        let store = Arc::new(MemoryChunkStore::new());
        let index = Arc::new(IndexManager::new(store, None, ChunkingParams::default()));

        let transcript = Transcript::new(vec![Segment::new(
            0.0,
            10.0,
            "ownership moves values between bindings",
        )]);
        index.build("talk", &transcript, false).await.unwrap();

        let model = Arc::new(RecordingModel {
            last_prompt: Mutex::new(String::new()),
        });
        (QaEngine::new(index, model.clone()), model)
    }

    #[tokio::test]
    async fn test_ask_returns_answer_with_sources() {
        let (engine, _) = engine_with_index().await;
        let response = engine.ask("talk", "what is ownership?").await.unwrap();

        assert!(response.answer.contains("ownership"));
        assert_eq!(response.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_citations_and_question() {
        let (engine, model) = engine_with_index().await;
        engine.ask("talk", "what is ownership?").await.unwrap();

        let prompt = model.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("[1 00:00-00:10]"));
        assert!(prompt.contains("Question: what is ownership?"));
        assert!(prompt.contains("'talk'"));
    }

    #[tokio::test]
    async fn test_unindexed_video_errors() {
        let (engine, _) = engine_with_index().await;
        assert!(engine.ask("ghost", "anything?").await.is_err());
    }

    #[test]
    fn test_display_includes_sources() {
        let response = QaResponse {
            answer: "An answer.".to_string(),
            sources: vec![RetrievedChunk {
                chunk_id: "chunk-1".into(),
                video_name: "talk".into(),
                text: "text".into(),
                start_seconds: 0.0,
                end_seconds: 10.0,
                score: 0.87,
            }],
        };

        let display = response.format_for_display();
        assert!(display.contains("--- Sources ---"));
        assert!(display.contains("[1 00:00-00:10]"));
    }
}
