//! Ingestion orchestrator: detect, load, chunk, embed, store.
//!
//! This is the pipeline's failure boundary. Every error raised below it is
//! caught here and turned into an [`IngestionResult`] record; batch runs
//! process each source independently so one bad source never aborts the
//! rest.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunker;
use crate::config::ChunkingConfig;
use crate::detect;
use crate::error::PipelineError;
use crate::index::VectorIndex;
use crate::loader;
use crate::models::{
    BatchIngestionResult, ContentKind, IngestionResult, ProcessingSummary, SourceOutcome,
    SourceSpec,
};

pub struct IngestionPipeline {
    index: Arc<VectorIndex>,
    chunking: ChunkingConfig,
    http: reqwest::Client,
}

impl IngestionPipeline {
    pub fn new(index: Arc<VectorIndex>, chunking: ChunkingConfig) -> Self {
        Self {
            index,
            chunking,
            http: reqwest::Client::new(),
        }
    }

    /// Run the full pipeline for one source. Always returns a result
    /// record; failures are reported, never propagated.
    pub async fn process_source(
        &self,
        source: &str,
        kind: Option<ContentKind>,
    ) -> IngestionResult {
        match self.try_process(source, kind).await {
            Ok(result) => result,
            Err(e) => {
                warn!(source = %source, error = %e, "ingestion failed");
                IngestionResult::failure(format!("pipeline failed for {}: {}", source, e))
            }
        }
    }

    async fn try_process(
        &self,
        source: &str,
        kind: Option<ContentKind>,
    ) -> Result<IngestionResult, PipelineError> {
        let resolved = detect::detect_kind(source, kind);
        info!(source = %source, kind = %resolved, "ingesting source");

        let documents = loader::load_source(source, resolved, &self.http).await?;
        if documents.is_empty() {
            return Ok(IngestionResult::failure(format!(
                "No documents loaded from {}",
                source
            )));
        }

        let chunks = chunker::chunk_documents(&documents, &self.chunking);
        if chunks.is_empty() {
            return Ok(IngestionResult::failure(format!(
                "No chunks created from {}",
                source
            )));
        }

        // One transaction writes the new set and drops rows a previous,
        // longer run left behind, so the index never mixes stale and
        // fresh chunks and a failed run changes nothing.
        let outcome = self.index.store(source, &chunks).await?;
        if outcome.removed > 0 {
            info!(source = %source, removed = outcome.removed, "removed stale chunks");
        }
        let stored = outcome.stored;

        let sources: Vec<String> = chunks
            .iter()
            .map(|c| c.meta.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(source = %source, chunks = stored, "ingestion complete");

        Ok(IngestionResult {
            success: true,
            message: format!("Successfully stored {} document chunks", stored),
            chunk_count: Some(stored),
            sources: Some(sources),
            processing_summary: Some(ProcessingSummary {
                source: source.to_string(),
                source_type: resolved,
                document_count: documents.len(),
                chunk_count: stored,
            }),
        })
    }

    /// Ingest several sources, each isolated from the others' failures.
    /// The batch counts success when at least one source succeeded.
    pub async fn process_multiple_sources(&self, specs: &[SourceSpec]) -> BatchIngestionResult {
        let mut detailed_results = Vec::with_capacity(specs.len());
        let mut successful_sources = 0;
        let mut total_chunks_stored = 0;

        for spec in specs {
            let result = self.process_source(&spec.source, spec.kind).await;
            if result.success {
                successful_sources += 1;
                total_chunks_stored += result.chunk_count.unwrap_or(0);
            }
            detailed_results.push(SourceOutcome {
                source: spec.source.clone(),
                result,
            });
        }

        let failed_sources = specs.len() - successful_sources;
        info!(
            total = specs.len(),
            ok = successful_sources,
            failed = failed_sources,
            "batch ingestion complete"
        );

        BatchIngestionResult {
            success: successful_sources > 0,
            total_sources: specs.len(),
            successful_sources,
            failed_sources,
            total_chunks_stored,
            detailed_results,
        }
    }
}
