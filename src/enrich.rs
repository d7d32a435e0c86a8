//! Provenance stamping, applied at both pipeline stages.
//!
//! Documents are stamped once when a loader produces them (source, kind,
//! ingestion time) and each chunk is stamped again with its id and position.
//! Every chunk that reaches the vector index carries the full set.

use chrono::Utc;

use crate::models::{Chunk, ChunkMeta, ContentKind, DocumentMeta, RawDocument};

/// Wrap loader output in [`RawDocument`]s stamped with source provenance.
/// All documents from one load share a single ingestion timestamp.
pub fn stamp_documents(texts: Vec<String>, source: &str, kind: ContentKind) -> Vec<RawDocument> {
    let now = Utc::now().to_rfc3339();
    texts
        .into_iter()
        .map(|text| RawDocument {
            text,
            meta: DocumentMeta {
                source: source.to_string(),
                source_type: kind,
                ingestion_timestamp: now.clone(),
            },
        })
        .collect()
}

/// Build a [`Chunk`] carrying its document's metadata plus chunk-level
/// provenance. `ordinal` is the run-wide position used for the chunk id;
/// `index`/`total` describe the position within the originating document.
pub fn stamp_chunk(
    doc: &DocumentMeta,
    text: String,
    ordinal: usize,
    index: usize,
    total: usize,
) -> Chunk {
    Chunk {
        text,
        ordinal,
        meta: ChunkMeta {
            source: doc.source.clone(),
            source_type: doc.source_type,
            ingestion_timestamp: doc.ingestion_timestamp.clone(),
            chunk_id: format!("{}_{}", doc.source, ordinal),
            chunk_index: index,
            total_chunks: total,
            original_source: doc.source.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_carry_complete_provenance() {
        let docs = stamp_documents(
            vec!["one".to_string(), "two".to_string()],
            "data.csv",
            ContentKind::Csv,
        );
        assert_eq!(docs.len(), 2);
        for d in &docs {
            assert_eq!(d.meta.source, "data.csv");
            assert_eq!(d.meta.source_type, ContentKind::Csv);
            assert!(!d.meta.ingestion_timestamp.is_empty());
        }
        assert_eq!(
            docs[0].meta.ingestion_timestamp,
            docs[1].meta.ingestion_timestamp
        );
    }

    #[test]
    fn chunk_stamp_inherits_and_extends() {
        let meta = DocumentMeta {
            source: "notes.txt".to_string(),
            source_type: ContentKind::Text,
            ingestion_timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let chunk = stamp_chunk(&meta, "body".to_string(), 7, 2, 5);
        assert_eq!(chunk.meta.chunk_id, "notes.txt_7");
        assert_eq!(chunk.meta.chunk_index, 2);
        assert_eq!(chunk.meta.total_chunks, 5);
        assert_eq!(chunk.meta.original_source, "notes.txt");
        assert_eq!(chunk.meta.source_type, ContentKind::Text);
    }
}
