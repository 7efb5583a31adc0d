//! A flat, persisted similarity index over embedded text chunks.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::TextChunk;
use crate::error::{QaError, Result};

/// File name of the serialized index inside the index directory.
const INDEX_FILE: &str = "index.json";

/// A retrieved [`TextChunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: TextChunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// A similarity index: chunks with their embeddings, searched exhaustively
/// by cosine similarity.
///
/// The index records the embedding model it was built with; [`check_model`]
/// catches a build-time/query-time model mismatch before it can silently
/// corrupt retrieval quality.
///
/// Persistence is a single JSON file under the index directory, overwritten
/// destructively on every save — no versioning, no atomic rename.
///
/// [`check_model`]: VectorIndex::check_model
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    embedding_model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings, paired 1:1.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Index`] if the two sequences differ in length.
    pub fn build(
        chunks: Vec<TextChunk>,
        embeddings: Vec<Vec<f32>>,
        embedding_model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(QaError::Index(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        Ok(Self { embedding_model: embedding_model.into(), dimensions, entries })
    }

    /// The embedding model identifier this index was built with.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verify the index was built with the given embedding model.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Index`] on a mismatch.
    pub fn check_model(&self, embedding_model: &str) -> Result<()> {
        if self.embedding_model != embedding_model {
            return Err(QaError::Index(format!(
                "index was built with embedding model '{}' but queried with '{}' — rebuild the index",
                self.embedding_model, embedding_model
            )));
        }
        Ok(())
    }

    /// Return the `k` chunks nearest the query embedding, nearest-first.
    ///
    /// Ties keep insertion order (stable sort).
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        debug!(results = scored.len(), k, "index search");
        scored
    }

    /// Persist the index to `<dir>/index.json`, creating the directory and
    /// destructively overwriting any prior index.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Index`] on I/O or serialization failure.
    pub fn save_local(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| QaError::Index(format!("failed to create '{}': {e}", dir.display())))?;
        let path = dir.join(INDEX_FILE);
        let bytes = serde_json::to_vec(self)
            .map_err(|e| QaError::Index(format!("failed to serialize index: {e}")))?;
        std::fs::write(&path, bytes)
            .map_err(|e| QaError::Index(format!("failed to write '{}': {e}", path.display())))?;
        info!(path = %path.display(), chunks = self.entries.len(), "index saved");
        Ok(())
    }

    /// Load a persisted index from `<dir>/index.json`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::IndexMissing`] if the file does not exist — the
    /// dominant user-facing error mode — and [`QaError::Index`] if it exists
    /// but cannot be read or parsed.
    pub fn load_local(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Err(QaError::IndexMissing { path: dir.to_path_buf() });
        }
        let bytes = std::fs::read(&path)
            .map_err(|e| QaError::Index(format!("failed to read '{}': {e}", path.display())))?;
        let index: Self = serde_json::from_slice(&bytes)
            .map_err(|e| QaError::Index(format!("failed to parse '{}': {e}", path.display())))?;
        debug!(path = %path.display(), chunks = index.entries.len(), "index loaded");
        Ok(index)
    }
}

/// Cosine similarity between two vectors; 0.0 if either has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
