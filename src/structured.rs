//! Structured field extraction: pull typed fields out of free text by
//! instructing the chat model to reply with strict JSON.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QaError, Result};
use crate::generation::{ChatMessage, ChatModel, ChatParams};

/// Overall sentiment of a review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Positive.
    Pos,
    /// Negative.
    Neg,
}

/// Fields extracted from a product review.
///
/// Optional fields stay `None` when the text does not mention them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewFields {
    /// Key themes discussed in the review.
    pub key_themes: Vec<String>,
    /// A brief summary of the review.
    pub summary: String,
    /// Overall sentiment.
    pub sentiment: Sentiment,
    /// Listed upsides, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pros: Option<Vec<String>>,
    /// Listed downsides, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cons: Option<Vec<String>>,
    /// Reviewer name, if stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

const EXTRACTION_INSTRUCTIONS: &str = "\
You extract structured data from product reviews. Reply with a single JSON \
object and nothing else, matching this shape exactly:\n\
{\n\
  \"key_themes\": [string, ...],   // key themes discussed in the review\n\
  \"summary\": string,             // a brief summary of the review\n\
  \"sentiment\": \"pos\" | \"neg\",  // overall sentiment\n\
  \"pros\": [string, ...] | null,  // listed upsides, null if none\n\
  \"cons\": [string, ...] | null,  // listed downsides, null if none\n\
  \"name\": string | null          // reviewer name, null if not stated\n\
}";

/// Extract [`ReviewFields`] from free review text.
///
/// Sends one chat completion instructing strict-JSON output and deserializes
/// the reply. A Markdown code fence around the JSON is tolerated.
///
/// # Errors
///
/// Returns [`QaError::Chat`] if the request fails or the reply is not valid
/// JSON for the schema.
pub async fn extract_review(
    chat: &dyn ChatModel,
    params: &ChatParams,
    text: &str,
) -> Result<ReviewFields> {
    let messages = vec![
        ChatMessage::system(EXTRACTION_INSTRUCTIONS),
        ChatMessage::user(format!("REVIEW:\n{text}")),
    ];
    let reply = chat.complete(&messages, params).await?;
    let payload = strip_code_fence(&reply);

    debug!(reply_len = reply.len(), "parsing structured extraction reply");

    serde_json::from_str(payload).map_err(|e| QaError::Chat {
        provider: "OpenAI".into(),
        message: format!("model reply was not valid review JSON ({e}): {}", truncate(payload, 200)),
    })
}

/// Strip a surrounding Markdown code fence (```json ... ``` or ``` ... ```).
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_review_json() {
        let json = r#"{
            "key_themes": ["battery", "camera"],
            "summary": "A powerful phone with a stunning camera.",
            "sentiment": "pos",
            "pros": ["long battery life"],
            "cons": ["heavy"],
            "name": "Debo"
        }"#;
        let fields: ReviewFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.sentiment, Sentiment::Pos);
        assert_eq!(fields.name.as_deref(), Some("Debo"));
        assert_eq!(fields.key_themes.len(), 2);
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let json = r#"{
            "key_themes": ["price"],
            "summary": "Too expensive.",
            "sentiment": "neg",
            "pros": null
        }"#;
        let fields: ReviewFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.sentiment, Sentiment::Neg);
        assert!(fields.pros.is_none());
        assert!(fields.cons.is_none());
        assert!(fields.name.is_none());
    }

    #[test]
    fn strips_json_code_fence() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"a\": 1}");
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }
}
