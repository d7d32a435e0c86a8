//! JSON HTTP API over the ingestion pipeline and conversation chain.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ingest` | Ingest one source or a batch of sources |
//! | `POST` | `/chat` | Answer one message within a session |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Ingestion failures are data: `/ingest` answers 200 with `success: false`
//! when the pipeline ran and reported a failure, and 400 only when the
//! request itself is malformed. `/chat` answers 400 for missing fields and
//! 500 with `{ "error": ... }` when retrieval or generation fails.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::chain::ConversationChain;
use crate::error::PipelineError;
use crate::ingest::IngestionPipeline;
use crate::models::{ContentKind, SourceSpec};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<IngestionPipeline>,
    chain: Arc<ConversationChain>,
}

/// Start the HTTP server on `bind` and serve until the process exits.
pub async fn run_server(
    bind: &str,
    pipeline: Arc<IngestionPipeline>,
    chain: Arc<ConversationChain>,
) -> anyhow::Result<()> {
    let state = AppState { pipeline, chain };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ingest", post(handle_ingest))
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    info!(bind = %bind, "server listening");

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ingest ============

/// Either `source` (single) or `sources` (batch) must be present. `kind`
/// forces the single source's kind, or serves as the default for batch
/// entries that do not carry their own.
#[derive(Deserialize)]
struct IngestRequest {
    source: Option<String>,
    sources: Option<Vec<SourceSpec>>,
    kind: Option<ContentKind>,
}

fn apply_default_kind(mut specs: Vec<SourceSpec>, default: Option<ContentKind>) -> Vec<SourceSpec> {
    for spec in &mut specs {
        if spec.kind.is_none() {
            spec.kind = default;
        }
    }
    specs
}

async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    match (request.source, request.sources) {
        (Some(source), None) => {
            let result = state.pipeline.process_source(&source, request.kind).await;
            let json = serde_json::to_value(&result).map_err(|e| internal_error(e.to_string()))?;
            Ok(Json(json))
        }
        (None, Some(sources)) => {
            if sources.is_empty() {
                return Err(bad_request("sources must not be empty"));
            }
            let sources = apply_default_kind(sources, request.kind);
            let result = state.pipeline.process_multiple_sources(&sources).await;
            let json = serde_json::to_value(&result).map_err(|e| internal_error(e.to_string()))?;
            Ok(Json(json))
        }
        (Some(_), Some(_)) => Err(bad_request("provide either source or sources, not both")),
        (None, None) => Err(bad_request("either source or sources is required")),
    }
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    session_id: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    answer: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("session_id is required"))?;
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| bad_request("message is required"))?;

    let answer = state
        .chain
        .answer(&session_id, &message)
        .await
        .map_err(|e| match e {
            PipelineError::InvalidRequest(msg) => bad_request(msg),
            other => internal_error(other.to_string()),
        })?;

    Ok(Json(ChatResponse { session_id, answer }))
}
