//! Error types for the `docqa` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
///
/// Every pipeline stage returns this type uniformly, so callers handle
/// failure from "build" and "ask" the same way.
#[derive(Debug, Error)]
pub enum QaError {
    /// A configuration validation error, including a missing API credential.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input: no documents for "build", or a blank question.
    #[error("Input error: {0}")]
    Input(String),

    /// "ask" was attempted before any index was built.
    #[error("No index found at '{}'", .path.display())]
    IndexMissing {
        /// The directory that was expected to hold the persisted index.
        path: PathBuf,
    },

    /// An error from the embedding service.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from the chat completion service.
    #[error("Chat error ({provider}): {message}")]
    Chat {
        /// The chat provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A document file could not be read from disk.
    ///
    /// Extraction itself never fails: an unreadable or empty document just
    /// yields no text.
    #[error("Extraction error in '{source_name}': {message}")]
    Extraction {
        /// Name of the offending document.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An index persistence or load failure other than "missing":
    /// I/O, serialization, or an embedding-model mismatch.
    #[error("Index error: {0}")]
    Index(String),

    /// A prompt template could not be loaded or rendered.
    #[error("Template error: {0}")]
    Template(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, QaError>;
