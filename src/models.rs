//! Core data types that flow through the ingestion and retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Classification of a source's format, driving loader selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Pdf,
    Docx,
    Csv,
    Text,
    Web,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Pdf => "pdf",
            ContentKind::Docx => "docx",
            ContentKind::Csv => "csv",
            ContentKind::Text => "text",
            ContentKind::Web => "web",
            ContentKind::Image => "image",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ContentKind::Pdf),
            "docx" => Ok(ContentKind::Docx),
            "csv" => Ok(ContentKind::Csv),
            "text" => Ok(ContentKind::Text),
            "web" => Ok(ContentKind::Web),
            "image" => Ok(ContentKind::Image),
            other => Err(format!(
                "unknown source kind '{}' (expected pdf, docx, csv, text, web, or image)",
                other
            )),
        }
    }
}

/// Provenance stamped on every document when it is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub source: String,
    pub source_type: ContentKind,
    /// RFC 3339 timestamp of the ingestion run that produced this document.
    pub ingestion_timestamp: String,
}

/// One logical unit of content as produced by a loader. Owned by the
/// pipeline run that created it; discarded after chunking.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub text: String,
    pub meta: DocumentMeta,
}

/// Full provenance carried by a chunk: the originating document's metadata
/// plus the chunk's position within it. Sufficient to reconstruct where a
/// chunk came from without consulting the original source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub source: String,
    pub source_type: ContentKind,
    pub ingestion_timestamp: String,
    /// Deterministic `{source}_{ordinal}` identifier, stable across
    /// re-ingestion of the same source. Upsert key in the index.
    pub chunk_id: String,
    /// Zero-based position within the originating document.
    pub chunk_index: usize,
    /// Number of chunks the originating document produced.
    pub total_chunks: usize,
    pub original_source: String,
}

/// A bounded text window derived from exactly one [`RawDocument`].
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    /// Zero-based position within the whole ingestion run for the source.
    /// Distinct from `meta.chunk_index` when one source loads as several
    /// documents (e.g. CSV rows); `chunk_id` is derived from this, which
    /// keeps ids unique within a run.
    pub ordinal: usize,
    pub meta: ChunkMeta,
}

/// A ranked search hit returned by the vector index, shaped like the
/// document it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedDocument {
    pub text: String,
    pub meta: ChunkMeta,
    pub score: f32,
}

/// One conversation exchange: a user message and the assistant's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

/// Summary of what a single-source pipeline run did.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSummary {
    pub source: String,
    pub source_type: ContentKind,
    pub document_count: usize,
    pub chunk_count: usize,
}

/// Outcome record for a single-source ingestion run. Failures are data,
/// never a crash.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_summary: Option<ProcessingSummary>,
}

impl IngestionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        IngestionResult {
            success: false,
            message: message.into(),
            chunk_count: None,
            sources: None,
            processing_summary: None,
        }
    }
}

/// A source to ingest plus an optional explicit kind override.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub source: String,
    #[serde(default)]
    pub kind: Option<ContentKind>,
}

/// Per-source entry inside a batch result.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub result: IngestionResult,
}

/// Aggregate outcome of a batch ingestion run. Sources are processed
/// independently; one failure never aborts the others.
#[derive(Debug, Clone, Serialize)]
pub struct BatchIngestionResult {
    pub success: bool,
    pub total_sources: usize,
    pub successful_sources: usize,
    pub failed_sources: usize,
    pub total_chunks_stored: usize,
    pub detailed_results: Vec<SourceOutcome>,
}
