//! Retrieval-augmented conversation chain.
//!
//! One question flows: history snapshot, top-k retrieval, prompt assembly,
//! generation, history append. The history is only extended after a
//! successful generation, so a failed turn leaves the transcript unchanged
//! and the caller can simply retry.

use std::sync::Arc;

use tracing::info;

use crate::error::PipelineError;
use crate::generation::{ChatMessage, GenerationProvider};
use crate::history::SessionStore;
use crate::retriever::{format_context, Retriever};

const SYSTEM_PROMPT: &str = "You are DocChat, a retrieval-augmented assistant. \
Answer strictly from the provided context. \
If the answer is not in the context, say you don't know.";

pub struct ConversationChain {
    retriever: Retriever,
    generator: Arc<dyn GenerationProvider>,
    history: Arc<SessionStore>,
}

impl ConversationChain {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn GenerationProvider>,
        history: Arc<SessionStore>,
    ) -> Self {
        Self {
            retriever,
            generator,
            history,
        }
    }

    /// Answer one user message within a session. Retrieval uses only the
    /// current message; history is carried in the prompt, not the query.
    pub async fn answer(&self, session_id: &str, message: &str) -> Result<String, PipelineError> {
        let turns = self.history.snapshot(session_id);
        let retrieved = self.retriever.retrieve(message).await?;
        info!(
            session = %session_id,
            hits = retrieved.len(),
            "answering with retrieved context"
        );

        let context = format_context(&retrieved);

        let mut messages = Vec::with_capacity(turns.len() * 2 + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        for turn in &turns {
            messages.push(ChatMessage::user(&turn.user));
            messages.push(ChatMessage::assistant(&turn.assistant));
        }
        messages.push(ChatMessage::user(format!(
            "Question: {}\n\nContext:\n{}\n\nAnswer concisely with sources when relevant.",
            message, context
        )));

        let answer = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| PipelineError::GenerationFailure(e.to_string()))?;

        self.history
            .append(session_id, message.to_string(), answer.clone());

        Ok(answer)
    }
}
