//! Data types for uploaded documents and text chunks, plus text extraction.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QaError, Result};

/// An uploaded document: raw bytes plus the name it was uploaded under.
///
/// Consumed by [`extract_text`] immediately; not retained afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// The file name the document was uploaded under.
    pub name: String,
    /// The raw byte content.
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a document from a name and byte content.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    /// Read a document from a file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| QaError::Extraction {
            source_name: name.clone(),
            message: format!("failed to read file: {e}"),
        })?;
        Ok(Self { name, bytes })
    }

    fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF") || self.name.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// A bounded, overlapping slice of source text — the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextChunk {
    /// The text content of the chunk.
    pub text: String,
    /// Character offset of this chunk into the source blob.
    pub offset: usize,
}

/// Extract a single text blob from a set of uploaded documents.
///
/// PDF documents are read page by page; pages that yield no extractable text
/// (scanned images, say) are skipped without error, as is a PDF whose
/// container cannot be opened at all. Non-PDF documents are decoded as
/// UTF-8, lossily. Page texts and document texts are joined with newline
/// separators.
///
/// Never fails: the result may legitimately be empty.
pub fn extract_text(docs: &[RawDocument]) -> String {
    let mut text = String::new();
    for doc in docs {
        let extracted = if doc.is_pdf() { extract_pdf_text(doc) } else { extract_plain_text(doc) };
        if !extracted.is_empty() {
            text.push_str(&extracted);
            text.push('\n');
        }
        debug!(document = %doc.name, chars = extracted.chars().count(), "extracted document text");
    }
    text
}

/// Extract per-page text from a PDF, skipping pages with nothing extractable.
fn extract_pdf_text(doc: &RawDocument) -> String {
    let pdf = match lopdf::Document::load_mem(&doc.bytes) {
        Ok(pdf) => pdf,
        Err(e) => {
            warn!(document = %doc.name, error = %e, "unreadable PDF, skipping");
            return String::new();
        }
    };

    let mut pages = String::new();
    for page_number in pdf.get_pages().keys() {
        match pdf.extract_text(&[*page_number]) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    if !pages.is_empty() {
                        pages.push('\n');
                    }
                    pages.push_str(page_text);
                }
            }
            Err(e) => {
                // A page without a usable text layer is skipped, not fatal.
                warn!(document = %doc.name, page = page_number, error = %e, "skipping page");
            }
        }
    }
    pages
}

fn extract_plain_text(doc: &RawDocument) -> String {
    String::from_utf8_lossy(&doc.bytes).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_documents_concatenate_with_newlines() {
        let docs = vec![
            RawDocument::new("a.txt", b"first document".to_vec()),
            RawDocument::new("b.txt", b"second document".to_vec()),
        ];
        let text = extract_text(&docs);
        assert_eq!(text, "first document\nsecond document\n");
    }

    #[test]
    fn empty_documents_yield_empty_blob() {
        let docs = vec![RawDocument::new("empty.txt", Vec::new())];
        assert_eq!(extract_text(&docs), "");
    }

    #[test]
    fn malformed_pdf_yields_empty_text_not_an_error() {
        let docs = vec![RawDocument::new("bad.pdf", b"%PDF-not-really".to_vec())];
        assert_eq!(extract_text(&docs), "");
    }
}
