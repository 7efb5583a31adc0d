//! Interactive shell for the question-answering pipeline.
//!
//! Presents the two pipeline actions (`build`, `ask`) plus structured review
//! extraction. Blocks on each action in turn; errors are rendered per kind
//! and never abort the session, except for a missing credential at startup.

use std::io::{BufRead, Write};
use std::sync::Arc;

use docqa::{
    Answer, OpenAiChat, OpenAiEmbeddings, QaConfig, QaError, QaPipeline, RawDocument,
};

#[tokio::main]
async fn main() {
    // .env is optional; a missing file is not an error.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info".into()),
        )
        .init();

    let api_key = match QaConfig::api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let pipeline = match build_pipeline(&api_key) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!("docqa — document question answering");
    print_help();
    repl(&pipeline).await;
}

fn build_pipeline(api_key: &str) -> docqa::Result<QaPipeline> {
    let config = QaConfig::builder().build()?;
    let embedder = OpenAiEmbeddings::new(api_key, &config.embedding_model)?;
    let chat = OpenAiChat::new(api_key, &config.chat_model)?;
    QaPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .chat_model(Arc::new(chat))
        .build()
}

fn print_help() {
    println!("commands:");
    println!("  build <file> [<file>...]   extract, chunk, embed, and index documents");
    println!("  ask <question>             answer a question from the indexed documents");
    println!("  extract <file>             extract structured review fields from a text file");
    println!("  quit                       exit");
}

async fn repl(pipeline: &QaPipeline) {
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }

        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => {}
            "build" => run_build(pipeline, rest).await,
            "ask" => run_ask(pipeline, rest).await,
            "extract" => run_extract(pipeline, rest).await,
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command '{other}' — try 'help'"),
        }
    }
}

async fn run_build(pipeline: &QaPipeline, args: &str) {
    let mut docs = Vec::new();
    for path in args.split_whitespace() {
        match RawDocument::from_path(path) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                render_error(&e);
                return;
            }
        }
    }
    match pipeline.build_index(&docs).await {
        Ok(summary) => println!(
            "indexed {} chunk(s) from {} document(s) into '{}'",
            summary.chunks,
            summary.documents,
            pipeline.config().index_path.display()
        ),
        Err(e) => render_error(&e),
    }
}

async fn run_ask(pipeline: &QaPipeline, question: &str) {
    match pipeline.ask(question).await {
        Ok(Answer::Text { answer, context }) => {
            println!("--- retrieved context ---");
            let preview: String = context.chars().take(2000).collect();
            println!("{preview}{}", if context.chars().count() > 2000 { "… (truncated)" } else { "" });
            println!("--- answer ---");
            println!("{answer}");
        }
        Ok(Answer::NoContext) => {
            println!("no relevant context found in the index — re-process documents or raise top_k");
        }
        Err(e) => render_error(&e),
    }
}

async fn run_extract(pipeline: &QaPipeline, path: &str) {
    if path.is_empty() {
        println!("warning: give a text file to extract from");
        return;
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: failed to read '{path}': {e}");
            return;
        }
    };
    match pipeline.extract_fields(&text).await {
        Ok(fields) => match serde_json::to_string_pretty(&fields) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: {e}"),
        },
        Err(e) => render_error(&e),
    }
}

/// Render an error per its kind: input problems are warnings, a missing
/// index gets a hint, everything else is a generic error line.
fn render_error(err: &QaError) {
    match err {
        QaError::Input(message) => println!("warning: {message}"),
        QaError::IndexMissing { .. } => println!("{err} (run 'build' before 'ask')"),
        _ => eprintln!("error: {err}"),
    }
}
