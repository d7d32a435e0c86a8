//! # DocChat
//!
//! A retrieval-augmented document chat engine: ingest documents from files
//! and the web into a SQLite vector index, then answer questions about them
//! with per-session conversation memory.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │   Sources    │──▶│   Pipeline    │──▶│  SQLite   │
//! │ pdf/docx/csv │   │ Chunk+Embed  │   │  vectors  │
//! │ text/web     │   └──────────────┘   └────┬─────┘
//! └──────────────┘                           │
//!                       ┌────────────────────┤
//!                       ▼                    ▼
//!                  ┌──────────┐        ┌──────────┐
//!                  │   CLI    │        │   HTTP   │
//!                  │ (docchat)│        │  (JSON)  │
//!                  └──────────┘        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docchat init                          # create database
//! docchat ingest report.pdf notes.txt   # ingest sources
//! docchat ask "what does the report conclude?"
//! docchat serve                         # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`detect`] | Source kind detection |
//! | [`loader`] | Format-specific document loaders |
//! | [`chunker`] | Overlapping text windows |
//! | [`index`] | SQLite vector index |
//! | [`ingest`] | Ingestion orchestrator |
//! | [`retriever`] | Top-k retrieval |
//! | [`chain`] | Retrieval-augmented conversation |
//! | [`server`] | JSON HTTP server |

pub mod chain;
pub mod chunker;
pub mod config;
pub mod db;
pub mod detect;
pub mod embedding;
pub mod enrich;
pub mod error;
pub mod generation;
pub mod history;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod migrate;
pub mod models;
pub mod retriever;
pub mod server;
