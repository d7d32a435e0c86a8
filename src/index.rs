//! SQLite-backed vector index.
//!
//! Chunks are upserted by their deterministic `chunk_id`, so re-ingesting a
//! source overwrites the rows in place instead of appending duplicates, and
//! stale tail rows from a longer previous run are pruned in the same
//! transaction as the write.
//! Embeddings are stored as little-endian f32 BLOBs; search embeds the query
//! and ranks every stored vector by cosine similarity.

use std::sync::Arc;

use sqlx::{Row, SqlitePool};

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::error::PipelineError;
use crate::models::{Chunk, ChunkMeta, RetrievedDocument};

pub struct VectorIndex {
    pool: SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
}

/// What one [`VectorIndex::store`] call did: rows written and stale rows
/// pruned.
#[derive(Debug, Clone, Copy)]
pub struct StoredBatch {
    pub stored: usize,
    pub removed: u64,
}

impl VectorIndex {
    pub fn new(pool: SqlitePool, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { pool, embedder }
    }

    /// Embed and upsert a batch of chunks for `source`, pruning rows a
    /// previous, longer run left behind (ordinal at or beyond the new
    /// count). All-or-nothing: one provider call, then prune and upserts
    /// in a single transaction, so a failure anywhere leaves the index
    /// exactly as it was.
    pub async fn store(&self, source: &str, chunks: &[Chunk]) -> Result<StoredBatch, PipelineError> {
        if chunks.is_empty() {
            return Ok(StoredBatch {
                stored: 0,
                removed: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| PipelineError::StorageFailure(format!("embedding failed: {}", e)))?;

        if vectors.len() != chunks.len() {
            return Err(PipelineError::StorageFailure(format!(
                "embedding count mismatch: {} texts, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;

        // Ordinals are contiguous from zero, so this deletes exactly the
        // rows the upserts below will not overwrite.
        let removed = sqlx::query("DELETE FROM chunks WHERE source = ? AND ordinal >= ?")
            .bind(source)
            .bind(chunks.len() as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?
            .rows_affected();

        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            let metadata_json = serde_json::to_string(&chunk.meta)
                .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO chunks (
                    chunk_id, source, source_type, ordinal, chunk_index,
                    total_chunks, text, metadata_json, embedding, ingested_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    source = excluded.source,
                    source_type = excluded.source_type,
                    ordinal = excluded.ordinal,
                    chunk_index = excluded.chunk_index,
                    total_chunks = excluded.total_chunks,
                    text = excluded.text,
                    metadata_json = excluded.metadata_json,
                    embedding = excluded.embedding,
                    ingested_at = excluded.ingested_at
                "#,
            )
            .bind(&chunk.meta.chunk_id)
            .bind(&chunk.meta.source)
            .bind(chunk.meta.source_type.as_str())
            .bind(chunk.ordinal as i64)
            .bind(chunk.meta.chunk_index as i64)
            .bind(chunk.meta.total_chunks as i64)
            .bind(&chunk.text)
            .bind(&metadata_json)
            .bind(vec_to_blob(vector))
            .bind(&chunk.meta.ingestion_timestamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;

        Ok(StoredBatch {
            stored: chunks.len(),
            removed,
        })
    }

    /// Rank every stored chunk against the query by cosine similarity and
    /// return the top `k`. Ties break on `chunk_id` so results are stable.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, PipelineError> {
        let vectors = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(|e| PipelineError::StorageFailure(format!("embedding failed: {}", e)))?;
        let query_vec = vectors
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::StorageFailure("empty embedding response".into()))?;

        let rows = sqlx::query("SELECT chunk_id, text, metadata_json, embedding FROM chunks")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;

        let mut scored: Vec<(String, RetrievedDocument)> = Vec::with_capacity(rows.len());
        for row in rows {
            let chunk_id: String = row.get("chunk_id");
            let text: String = row.get("text");
            let metadata_json: String = row.get("metadata_json");
            let blob: Vec<u8> = row.get("embedding");

            let meta: ChunkMeta = serde_json::from_str(&metadata_json)
                .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;
            let score = cosine_similarity(&query_vec, &blob_to_vec(&blob));

            scored.push((chunk_id, RetrievedDocument { text, meta, score }));
        }

        scored.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Number of chunks currently stored.
    pub async fn len(&self) -> Result<u64, PipelineError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PipelineError::StorageFailure(e.to_string()))?;
        Ok(count as u64)
    }
}
