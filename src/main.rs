//! # DocChat CLI (`docchat`)
//!
//! The `docchat` binary is the primary interface for DocChat. It provides
//! commands for database initialization, document ingestion, one-off
//! questions, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat init` | Create the SQLite database and run schema migrations |
//! | `docchat ingest <sources>...` | Ingest files or URLs into the index |
//! | `docchat ask "<question>"` | Ask a question against the index |
//! | `docchat serve` | Start the JSON HTTP server |

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use docchat::chain::ConversationChain;
use docchat::config;
use docchat::db;
use docchat::embedding;
use docchat::generation;
use docchat::history::SessionStore;
use docchat::index::VectorIndex;
use docchat::ingest::IngestionPipeline;
use docchat::migrate;
use docchat::models::{ContentKind, SourceSpec};
use docchat::retriever::Retriever;
use docchat::server;

/// DocChat — a retrieval-augmented document chat engine.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docchat.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "DocChat — a retrieval-augmented document chat engine",
    version,
    long_about = "DocChat ingests documents (PDF, DOCX, CSV, plain text, web pages) into a \
    SQLite vector index and answers questions about them with per-session conversation \
    memory, via a CLI and a JSON HTTP server."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the chunks table. This command
    /// is idempotent.
    Init,

    /// Ingest one or more sources into the vector index.
    ///
    /// Each source is a file path or an http(s) URL. Sources are processed
    /// independently; a failure in one never aborts the others. Re-ingesting
    /// a source replaces its previous chunks.
    Ingest {
        /// File paths or URLs to ingest.
        #[arg(required = true)]
        sources: Vec<String>,

        /// Force a source kind (pdf, docx, csv, text, web, image) instead
        /// of detecting it from the extension or URL scheme.
        #[arg(long)]
        kind: Option<ContentKind>,
    },

    /// Ask a question against the index.
    ///
    /// Retrieves the most relevant chunks, asks the generation model, and
    /// prints the answer. Conversation memory is per-session and in-memory,
    /// so each CLI invocation starts a fresh session.
    Ask {
        /// The question to answer.
        question: String,

        /// Session key for the conversation history.
        #[arg(long, default_value = "cli")]
        session: String,
    },

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves
    /// `/ingest`, `/chat`, and `/health`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg.db.path).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { sources, kind } => {
            let index = build_index(&cfg).await?;
            let pipeline = build_pipeline(&cfg, index);

            let success = if let [source] = sources.as_slice() {
                let result = pipeline.process_source(source, kind).await;
                println!("{}", serde_json::to_string_pretty(&result)?);
                result.success
            } else {
                let specs: Vec<SourceSpec> = sources
                    .into_iter()
                    .map(|source| SourceSpec { source, kind })
                    .collect();
                let result = pipeline.process_multiple_sources(&specs).await;
                println!("{}", serde_json::to_string_pretty(&result)?);
                result.success
            };

            if !success {
                std::process::exit(1);
            }
        }
        Commands::Ask { question, session } => {
            let index = build_index(&cfg).await?;
            let chain = build_chain(&cfg, index)?;
            let answer = chain.answer(&session, &question).await?;
            println!("{}", answer);
        }
        Commands::Serve => {
            let index = build_index(&cfg).await?;
            let pipeline = build_pipeline(&cfg, Arc::clone(&index));
            let chain = build_chain(&cfg, index)?;
            server::run_server(&cfg.server.bind, pipeline, chain).await?;
        }
    }

    Ok(())
}

async fn build_index(cfg: &config::Config) -> anyhow::Result<Arc<VectorIndex>> {
    let pool = db::connect(&cfg.db.path).await?;
    migrate::run_migrations(&pool).await?;
    let embedder = embedding::create_embedder(&cfg.embedding)?;
    Ok(Arc::new(VectorIndex::new(pool, embedder)))
}

fn build_pipeline(cfg: &config::Config, index: Arc<VectorIndex>) -> Arc<IngestionPipeline> {
    Arc::new(IngestionPipeline::new(index, cfg.chunking.clone()))
}

fn build_chain(
    cfg: &config::Config,
    index: Arc<VectorIndex>,
) -> anyhow::Result<Arc<ConversationChain>> {
    let retriever = Retriever::new(index, cfg.retrieval.top_k);
    let generator = generation::create_generator(&cfg.generation)?;
    Ok(Arc::new(ConversationChain::new(
        retriever,
        generator,
        Arc::new(SessionStore::new()),
    )))
}
