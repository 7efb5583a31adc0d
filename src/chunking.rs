//! Text chunking: sliding-window splitting with natural-boundary preference.

use crate::document::TextChunk;

/// Boundary candidates in preference order: paragraph, sentence, word.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// A strategy for splitting a text blob into chunks.
///
/// Implementations must be stateless: the output is a pure function of the
/// input text and the chunker's parameters.
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of chunks.
    ///
    /// Returns an empty `Vec` for empty input.
    fn chunk(&self, text: &str) -> Vec<TextChunk>;
}

/// Splits text into overlapping windows of at most `chunk_size` characters.
///
/// Each chunk after the first begins exactly `chunk_overlap` characters
/// before the previous chunk's end, so consecutive chunks overlap by exactly
/// `chunk_overlap` and the chunks cover the source with no gaps: dropping the
/// first `chunk_overlap` characters of every chunk after the first and
/// concatenating reconstructs the input.
///
/// A chunk that ends before the end of the text prefers to break at a natural
/// boundary (paragraph, then sentence, then word) near the end of its window,
/// falling back to a hard character cut when no boundary is found. All sizes
/// are in characters; a cut never lands inside a UTF-8 code point.
///
/// Callers must enforce `chunk_overlap < chunk_size` (the config builder
/// does); the chunker itself only guards against non-progress.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SlidingWindowChunker {
    /// Create a new `SlidingWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end < total {
                // A boundary is only usable if the next chunk still makes
                // progress: end - overlap must exceed start.
                let floor = start + self.chunk_overlap + 1;
                if floor < hard_end {
                    last_boundary(&chars[start..hard_end], floor - start)
                        .map(|b| start + b)
                        .unwrap_or(hard_end)
                } else {
                    hard_end
                }
            } else {
                total
            };

            chunks.push(TextChunk {
                text: chars[start..end].iter().collect(),
                offset: start,
            });

            if end >= total {
                break;
            }
            let next = end.saturating_sub(self.chunk_overlap);
            if next <= start {
                break;
            }
            start = next;
        }

        chunks
    }
}

/// Find the latest natural boundary in `window` at or after `min_end`,
/// returning the cut position (just past the separator). Separators are
/// tried in preference order; the first kind with a hit wins.
fn last_boundary(window: &[char], min_end: usize) -> Option<usize> {
    for separator in SEPARATORS {
        let pattern: Vec<char> = separator.chars().collect();
        if window.len() < pattern.len() {
            continue;
        }
        let mut pos = window.len() - pattern.len();
        loop {
            if window[pos..pos + pattern.len()] == pattern[..] {
                let cut = pos + pattern.len();
                if cut >= min_end {
                    return Some(cut);
                }
                break;
            }
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
    }
    None
}
