//! Pipeline orchestrator: "build index" and "ask question" end to end.
//!
//! The [`QaPipeline`] composes an [`EmbeddingProvider`], a [`ChatModel`], and
//! a [`Chunker`] around a persisted [`VectorIndex`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{QaPipeline, QaConfig, OpenAiEmbeddings, OpenAiChat};
//!
//! let config = QaConfig::default();
//! let api_key = QaConfig::api_key_from_env()?;
//! let pipeline = QaPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(OpenAiEmbeddings::new(&api_key, &config.embedding_model)?))
//!     .chat_model(Arc::new(OpenAiChat::new(&api_key, &config.chat_model)?))
//!     .build()?;
//!
//! pipeline.build_index(&documents).await?;
//! let answer = pipeline.ask("What color is the sky?").await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::{Chunker, SlidingWindowChunker};
use crate::config::QaConfig;
use crate::context::assemble_context;
use crate::document::{extract_text, RawDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::generation::{self, ChatModel, ChatParams};
use crate::index::VectorIndex;
use crate::structured::{self, ReviewFields};

/// Counts reported after a successful index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of documents processed.
    pub documents: usize,
    /// Number of chunks embedded and indexed.
    pub chunks: usize,
}

/// Outcome of an "ask" action.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// The model's answer, with the context it was shown.
    Text {
        /// The generated answer (may be the no-answer sentinel).
        answer: String,
        /// The assembled context the model saw.
        context: String,
    },
    /// Retrieval succeeded but yielded no usable text. Informational, not an
    /// error — the caller may suggest rebuilding or raising `top_k`.
    NoContext,
}

/// The question-answering pipeline.
///
/// Single-threaded and sequential: each stage completes before the next
/// starts, the persisted index is reloaded fresh on every
/// [`ask`](QaPipeline::ask), and no internal locking or retry exists
/// anywhere. A build destructively overwrites the prior index.
pub struct QaPipeline {
    config: QaConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatModel>,
    chunker: Arc<dyn Chunker>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Build and persist the index: extract → chunk → embed → index → save.
    ///
    /// Overwrites any prior index at the configured path. Upstream failures
    /// (embedding service, I/O) propagate typed; there is no retry.
    ///
    /// # Errors
    ///
    /// - [`QaError::Input`] if `docs` is empty.
    /// - [`QaError::Embedding`] / [`QaError::Index`] from later stages.
    pub async fn build_index(&self, docs: &[RawDocument]) -> Result<IndexSummary> {
        if docs.is_empty() {
            return Err(QaError::Input("upload at least one document first".to_string()));
        }

        let text = extract_text(docs);
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            warn!(documents = docs.len(), "no extractable text; saving empty index");
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let index = VectorIndex::build(
            chunks,
            embeddings,
            self.embedder.model(),
            self.embedder.dimensions(),
        )?;
        index.save_local(&self.config.index_path)?;

        let summary = IndexSummary { documents: docs.len(), chunks: index.len() };
        info!(documents = summary.documents, chunks = summary.chunks, "index built");
        Ok(summary)
    }

    /// Answer a question from the persisted index: load → embed query →
    /// retrieve top-k → assemble context → generate.
    ///
    /// # Errors
    ///
    /// - [`QaError::Input`] if the question is blank.
    /// - [`QaError::IndexMissing`] if no index was ever built.
    /// - [`QaError::Index`] if the index was built with a different
    ///   embedding model than this pipeline's provider uses.
    /// - [`QaError::Embedding`] / [`QaError::Chat`] from the services.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(QaError::Input("enter a question first".to_string()));
        }

        let index = VectorIndex::load_local(&self.config.index_path)?;
        // Validate against the embedder the query will actually go through,
        // not the config string, which may disagree with the wired provider.
        index.check_model(self.embedder.model())?;

        let query_embedding = self.embedder.embed(question).await?;
        let retrieved = index.search(&query_embedding, self.config.top_k);
        let context = assemble_context(&retrieved, self.config.max_context_chars);

        if context.trim().is_empty() {
            info!("retrieval yielded no usable context");
            return Ok(Answer::NoContext);
        }

        let params = ChatParams {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };
        let answer = generation::answer(self.chat.as_ref(), &context, question, &params).await?;

        info!(retrieved = retrieved.len(), context_chars = context.chars().count(), "question answered");
        Ok(Answer::Text { answer, context })
    }

    /// Extract structured review fields from free text via the chat model.
    pub async fn extract_fields(&self, text: &str) -> Result<ReviewFields> {
        if text.trim().is_empty() {
            return Err(QaError::Input("enter some text first".to_string()));
        }
        let params = ChatParams {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };
        structured::extract_review(self.chat.as_ref(), &params, text).await
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// `config`, `embedding_provider`, and `chat_model` are required; the chunker
/// defaults to a [`SlidingWindowChunker`] sized from the config.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    chat: Option<Arc<dyn ChatModel>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the chat model.
    pub fn chat_model(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Override the default chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`QaPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if a required field is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config =
            self.config.ok_or_else(|| QaError::Config("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| QaError::Config("embedding_provider is required".to_string()))?;
        let chat =
            self.chat.ok_or_else(|| QaError::Config("chat_model is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(SlidingWindowChunker::new(config.chunk_size, config.chunk_overlap))
        });

        Ok(QaPipeline { config, embedder, chat, chunker })
    }
}
