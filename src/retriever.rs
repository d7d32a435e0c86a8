//! Top-k retrieval and context formatting for the conversation chain.

use std::sync::Arc;

use crate::error::PipelineError;
use crate::index::VectorIndex;
use crate::models::RetrievedDocument;

pub struct Retriever {
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Fetch the configured number of nearest chunks for a query. Fewer
    /// (or zero) hits than `top_k` is a normal outcome on a sparse index.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, PipelineError> {
        self.index.search(query, self.top_k).await
    }
}

/// Render retrieved chunks as a numbered context block, each entry tagged
/// with its source so the model can cite it.
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("[{}] {}\nSOURCE: {}", i + 1, doc.text, doc.meta.source))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkMeta, ContentKind};

    fn hit(text: &str, source: &str, score: f32) -> RetrievedDocument {
        RetrievedDocument {
            text: text.to_string(),
            meta: ChunkMeta {
                source: source.to_string(),
                source_type: ContentKind::Text,
                ingestion_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
                chunk_id: format!("{}_0", source),
                chunk_index: 0,
                total_chunks: 1,
                original_source: source.to_string(),
            },
            score,
        }
    }

    #[test]
    fn context_is_numbered_and_source_tagged() {
        let docs = vec![
            hit("The sky is blue.", "sky.txt", 0.9),
            hit("Grass is green.", "grass.txt", 0.7),
        ];
        let context = format_context(&docs);
        assert_eq!(
            context,
            "[1] The sky is blue.\nSOURCE: sky.txt\n\n[2] Grass is green.\nSOURCE: grass.txt"
        );
    }

    #[test]
    fn empty_results_format_to_empty_context() {
        assert_eq!(format_context(&[]), "");
    }
}
