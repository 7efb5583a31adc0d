//! Context assembly: joining retrieved chunks under a character budget.

use crate::index::ScoredChunk;

/// Delimiter placed between chunks in the assembled context.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Concatenate retrieved chunk texts, in order, into a single context string
/// of at most `max_chars` characters.
///
/// Chunks are joined with [`CONTEXT_DELIMITER`], and delimiters count against
/// the budget. The first chunk that would overflow is truncated to exactly
/// fill the remaining budget and assembly stops; later chunks are dropped
/// entirely. Empty chunk texts are skipped. The output is empty when nothing
/// was retrieved or every chunk was empty.
pub fn assemble_context(chunks: &[ScoredChunk], max_chars: usize) -> String {
    let delimiter_len = CONTEXT_DELIMITER.chars().count();
    let mut out = String::new();
    let mut used = 0usize;

    for scored in chunks {
        let text = scored.chunk.text.as_str();
        if text.is_empty() {
            continue;
        }
        let separator = if out.is_empty() { 0 } else { delimiter_len };
        let len = text.chars().count();

        if used + separator + len > max_chars {
            let remaining = max_chars.saturating_sub(used + separator);
            if remaining > 0 {
                if separator > 0 {
                    out.push_str(CONTEXT_DELIMITER);
                }
                out.extend(text.chars().take(remaining));
            }
            break;
        }

        if separator > 0 {
            out.push_str(CONTEXT_DELIMITER);
        }
        out.push_str(text);
        used += separator + len;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextChunk;

    fn scored(text: String) -> ScoredChunk {
        ScoredChunk { chunk: TextChunk { text, offset: 0 }, score: 1.0 }
    }

    #[test]
    fn overflowing_chunk_is_truncated_to_fill_the_budget() {
        let chunks = vec![scored("A".repeat(2000)), scored("B".repeat(2000))];
        let context = assemble_context(&chunks, 3000);

        let expected_b = 3000 - 2000 - CONTEXT_DELIMITER.chars().count();
        let expected = format!("{}{}{}", "A".repeat(2000), CONTEXT_DELIMITER, "B".repeat(expected_b));
        assert_eq!(context, expected);
        assert_eq!(context.chars().count(), 3000);
    }

    #[test]
    fn later_chunks_are_dropped_not_sampled() {
        let chunks =
            vec![scored("A".repeat(100)), scored("B".repeat(100)), scored("C".repeat(100))];
        let context = assemble_context(&chunks, 120);
        assert!(context.contains('B'));
        assert!(!context.contains('C'));
        assert!(context.chars().count() <= 120);
    }

    #[test]
    fn fits_entirely_when_under_budget() {
        let chunks = vec![scored("alpha".to_string()), scored("beta".to_string())];
        let context = assemble_context(&chunks, 100);
        assert_eq!(context, format!("alpha{CONTEXT_DELIMITER}beta"));
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let chunks = vec![scored(String::new()), scored("text".to_string())];
        assert_eq!(assemble_context(&chunks, 100), "text");
    }

    #[test]
    fn no_chunks_yields_empty_context() {
        assert_eq!(assemble_context(&[], 100), "");
    }
}
