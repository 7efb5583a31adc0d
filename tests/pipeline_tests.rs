//! End-to-end pipeline tests with deterministic mock providers.

use std::sync::Arc;

use async_trait::async_trait;
use docqa::{
    Answer, ChatMessage, ChatModel, ChatParams, EmbeddingProvider, QaConfig, QaError, QaPipeline,
    RawDocument, Result, NO_ANSWER_SENTINEL,
};

const DIM: usize = 16;

/// Deterministic bag-of-words embedder: each word lands in a hash bucket.
struct MockEmbedder {
    model: String,
}

impl MockEmbedder {
    fn new(model: &str) -> Self {
        Self { model: model.to_string() }
    }

    fn embed_text(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket: usize =
                word.to_lowercase().bytes().map(usize::from).sum::<usize>() % DIM;
            v[bucket] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Deterministic chat mock implementing the strict-context contract: if a
/// substantive question word appears in the context, reply with the context
/// sentence containing it; otherwise reply with the exact sentinel.
struct MockChat;

const STOPWORDS: &[&str] = &["the", "what", "who", "how", "why", "which", "does", "and", "was"];

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, messages: &[ChatMessage], _params: &ChatParams) -> Result<String> {
        let user = messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let context = user
            .split("CONTEXT:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\nQUESTION:\n").next())
            .unwrap_or_default();
        let question = user
            .split("\n\nQUESTION:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap_or_default();

        let context_lower = context.to_lowercase();
        for word in question
            .split(|c: char| !c.is_alphanumeric())
            .map(|w| w.to_lowercase())
            .filter(|w| w.len() >= 3 && !STOPWORDS.contains(&w.as_str()))
        {
            if context_lower.contains(&word) {
                let sentence = context
                    .split_inclusive('.')
                    .find(|s| s.to_lowercase().contains(&word))
                    .unwrap_or(context);
                return Ok(sentence.trim().to_string());
            }
        }
        Ok(NO_ANSWER_SENTINEL.to_string())
    }
}

fn pipeline_at(index_path: &std::path::Path, embedding_model: &str) -> QaPipeline {
    let config = QaConfig::builder()
        .embedding_model(embedding_model)
        .index_path(index_path)
        .build()
        .unwrap();
    QaPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(MockEmbedder::new(embedding_model)))
        .chat_model(Arc::new(MockChat))
        .build()
        .unwrap()
}

fn sky_document() -> RawDocument {
    RawDocument::new("facts.txt", b"The sky is blue. Grass is green.".to_vec())
}

#[tokio::test]
async fn build_then_ask_answers_from_context() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");

    let summary = pipeline.build_index(&[sky_document()]).await.unwrap();
    assert_eq!(summary.documents, 1);
    // The whole text fits one 2000-char chunk.
    assert_eq!(summary.chunks, 1);

    match pipeline.ask("What color is the sky?").await.unwrap() {
        Answer::Text { answer, context } => {
            assert!(answer.contains("blue"), "answer was: {answer}");
            assert_ne!(answer, NO_ANSWER_SENTINEL);
            assert!(context.contains("The sky is blue."));
        }
        Answer::NoContext => panic!("expected an answer"),
    }
}

#[tokio::test]
async fn unrelated_question_gets_the_exact_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");
    pipeline.build_index(&[sky_document()]).await.unwrap();

    match pipeline.ask("What is the capital of France?").await.unwrap() {
        Answer::Text { answer, .. } => assert_eq!(answer, NO_ANSWER_SENTINEL),
        Answer::NoContext => panic!("expected the sentinel answer"),
    }
}

#[tokio::test]
async fn ask_without_build_surfaces_index_missing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(&dir.path().join("never_built"), "mock-embedder");

    let err = pipeline.ask("anything?").await.unwrap_err();
    assert!(matches!(err, QaError::IndexMissing { .. }));
}

#[tokio::test]
async fn blank_question_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");

    let err = pipeline.ask("   ").await.unwrap_err();
    assert!(matches!(err, QaError::Input(_)));
}

#[tokio::test]
async fn build_with_no_documents_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");

    let err = pipeline.build_index(&[]).await.unwrap_err();
    assert!(matches!(err, QaError::Input(_)));
}

#[tokio::test]
async fn rebuilding_overwrites_and_answers_identically() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");
    let docs = [sky_document()];

    pipeline.build_index(&docs).await.unwrap();
    let first = pipeline.ask("What color is the sky?").await.unwrap();

    pipeline.build_index(&docs).await.unwrap();
    let second = pipeline.ask("What color is the sky?").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn embedding_model_mismatch_is_a_typed_error() {
    let dir = tempfile::tempdir().unwrap();

    let builder = pipeline_at(dir.path(), "mock-embedder");
    builder.build_index(&[sky_document()]).await.unwrap();

    let asker = pipeline_at(dir.path(), "other-embedder");
    let err = asker.ask("What color is the sky?").await.unwrap_err();
    assert!(matches!(err, QaError::Index(_)));
}

#[tokio::test]
async fn mismatch_is_caught_against_the_wired_embedder_not_the_config() {
    let dir = tempfile::tempdir().unwrap();

    let builder = pipeline_at(dir.path(), "mock-embedder");
    builder.build_index(&[sky_document()]).await.unwrap();

    // Config still names the build-time model, but the wired provider embeds
    // with a different one — the query must not slip through.
    let config = QaConfig::builder()
        .embedding_model("mock-embedder")
        .index_path(dir.path())
        .build()
        .unwrap();
    let asker = QaPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(MockEmbedder::new("other-embedder")))
        .chat_model(Arc::new(MockChat))
        .build()
        .unwrap();

    let err = asker.ask("What color is the sky?").await.unwrap_err();
    assert!(matches!(err, QaError::Index(_)));
}

#[tokio::test]
async fn empty_document_build_then_ask_reports_no_context() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_at(dir.path(), "mock-embedder");

    pipeline.build_index(&[RawDocument::new("empty.txt", Vec::new())]).await.unwrap();
    let outcome = pipeline.ask("What color is the sky?").await.unwrap();
    assert_eq!(outcome, Answer::NoContext);
}

#[tokio::test]
async fn extract_fields_parses_mocked_json() {
    struct JsonChat;

    #[async_trait]
    impl ChatModel for JsonChat {
        async fn complete(&self, _: &[ChatMessage], _: &ChatParams) -> Result<String> {
            Ok(r#"```json
{"key_themes": ["battery"], "summary": "Good phone.", "sentiment": "pos",
 "pros": ["fast"], "cons": null, "name": null}
```"#
                .to_string())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let config = QaConfig::builder().index_path(dir.path()).build().unwrap();
    let pipeline = QaPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(MockEmbedder::new("mock-embedder")))
        .chat_model(Arc::new(JsonChat))
        .build()
        .unwrap();

    let fields = pipeline.extract_fields("Great battery, very fast.").await.unwrap();
    assert_eq!(fields.key_themes, vec!["battery"]);
    assert_eq!(fields.summary, "Good phone.");
    assert!(fields.cons.is_none());
}
