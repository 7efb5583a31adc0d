//! # docqa
//!
//! Retrieval-augmented question answering over uploaded documents.
//!
//! The pipeline extracts text from documents, splits it into overlapping
//! chunks, embeds and indexes the chunks in a persisted flat vector index,
//! retrieves the nearest chunks for a question, assembles a bounded-size
//! context, and prompts a hosted chat model to answer strictly from that
//! context. Structured field extraction and JSON-loadable prompt templates
//! round out the surface.
//!
//! Two user actions drive everything:
//!
//! - **build**: [`QaPipeline::build_index`] — extract → chunk → embed →
//!   index → persist (destructive overwrite).
//! - **ask**: [`QaPipeline::ask`] — load index → embed query → retrieve
//!   top-k → assemble context → generate.
//!
//! All stages return a typed [`Result`]; asking before any build surfaces
//! [`QaError::IndexMissing`] rather than a crash, and a build/query
//! embedding-model mismatch is detected from index metadata.

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod structured;

pub use chunking::{Chunker, SlidingWindowChunker};
pub use config::{QaConfig, QaConfigBuilder, API_KEY_ENV};
pub use context::{assemble_context, CONTEXT_DELIMITER};
pub use document::{extract_text, RawDocument, TextChunk};
pub use embedding::{EmbeddingProvider, OpenAiEmbeddings};
pub use error::{QaError, Result};
pub use generation::{ChatMessage, ChatModel, ChatParams, OpenAiChat, NO_ANSWER_SENTINEL};
pub use index::{ScoredChunk, VectorIndex};
pub use pipeline::{Answer, IndexSummary, QaPipeline, QaPipelineBuilder};
pub use prompt::PromptTemplate;
pub use structured::{extract_review, ReviewFields, Sentiment};
