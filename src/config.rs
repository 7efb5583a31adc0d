//! Configuration for the question-answering pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// The environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration parameters for the pipeline.
///
/// An explicit object passed into each component at construction — there is
/// no ambient global. Construct via [`QaConfig::builder()`] to get parameter
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks to retrieve per question.
    pub top_k: usize,
    /// Character budget for the assembled prompt context.
    pub max_context_chars: usize,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
    /// Maximum output tokens for answer generation.
    pub max_output_tokens: u32,
    /// Embedding model identifier, used at build time and query time.
    pub embedding_model: String,
    /// Chat model identifier for answer generation.
    pub chat_model: String,
    /// Directory holding the persisted index.
    pub index_path: PathBuf,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            top_k: 4,
            max_context_chars: 3000,
            temperature: 0.2,
            max_output_tokens: 800,
            embedding_model: "text-embedding-3-large".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            index_path: PathBuf::from("faiss_index"),
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// Read the API credential from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if the variable is unset or empty. Callers
    /// (the shell) treat this as fatal at startup.
    pub fn api_key_from_env() -> Result<String> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(QaError::Config(format!(
                "{API_KEY_ENV} is not set — add it to your environment or .env file"
            ))),
        }
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of nearest chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the character budget for the assembled context.
    pub fn max_context_chars(mut self, max_chars: usize) -> Self {
        self.config.max_context_chars = max_chars;
        self
    }

    /// Set the sampling temperature for answer generation.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum output token budget for answer generation.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the chat model identifier.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    /// Set the directory holding the persisted index.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_context_chars == 0`
    pub fn build(self) -> Result<QaConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(QaError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_context_chars == 0 {
            return Err(QaError::Config("max_context_chars must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
