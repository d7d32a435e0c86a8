//! Typed failures produced by the ingestion and conversation pipelines.
//!
//! The ingestion orchestrator is the failure boundary: everything below it
//! is converted into an [`IngestionResult`](crate::models::IngestionResult)
//! record. The conversation chain surfaces [`PipelineError::GenerationFailure`]
//! to its caller untouched. The CLI and HTTP layers sit on `anyhow` and
//! translate these variants into exit codes or JSON error payloads.

use thiserror::Error;

use crate::models::ContentKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The kind is known to the detector but no loader can produce text
    /// from it (e.g. images without an OCR backend).
    #[error("unsupported source kind: {0}")]
    UnsupportedSourceKind(ContentKind),

    /// A loader failed on a malformed or unreachable source.
    /// (`source_name`, not `source`: thiserror reserves a field named
    /// `source` for the error chain and requires it to be an error type.)
    #[error("failed to load {source_name}: {cause}")]
    LoadFailure { source_name: String, cause: String },

    /// The vector index rejected a write or was unreachable.
    #[error("vector index failure: {0}")]
    StorageFailure(String),

    /// The generation backend returned an error.
    #[error("generation failed: {0}")]
    GenerationFailure(String),

    /// A required request field was missing or empty (boundary-layer).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl PipelineError {
    /// Shorthand for a [`PipelineError::LoadFailure`] carrying the source
    /// and the underlying cause.
    pub fn load(source: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        PipelineError::LoadFailure {
            source_name: source.into(),
            cause: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failure_message_names_source_and_cause() {
        let err = PipelineError::load("notes.txt", "no such file");
        assert!(matches!(err, PipelineError::LoadFailure { .. }));
        assert_eq!(err.to_string(), "failed to load notes.txt: no such file");
    }

    #[test]
    fn unsupported_kind_message_names_the_kind() {
        let err = PipelineError::UnsupportedSourceKind(ContentKind::Image);
        assert_eq!(err.to_string(), "unsupported source kind: image");
    }
}
