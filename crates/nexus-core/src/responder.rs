//! Retrieval-augmented answer generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_llm::provider::{Message, Role};
use nexus_llm::{LlmError, LlmProvider};
use nexus_memory::{ContextRetriever, DEFAULT_RETRIEVAL_LIMIT, QueryResult};

pub const SYSTEM_PROMPT: &str = "You are an AI assistant for a smart building management system. \
Use the provided context from building documents and sensor data to answer questions about \
maintenance, operations, and building systems. If you don't know the answer, say so rather \
than making up information.";

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),
}

/// A chat turn as exchanged with the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Builds the user turn: optional context block followed by the question.
#[must_use]
pub fn build_user_prompt(context: &QueryResult, question: &str) -> String {
    let mut prompt = String::new();
    if !context.is_empty() {
        prompt.push_str("Context from building documents:\n");
        prompt.push_str(&context.texts().join("\n\n"));
        prompt.push_str("\n\n");
    }
    prompt.push_str("User question: ");
    prompt.push_str(question);
    prompt
}

pub struct ChatResponder<P> {
    provider: P,
    retriever: Arc<ContextRetriever>,
    retrieval_limit: usize,
}

impl<P: LlmProvider> ChatResponder<P> {
    pub fn new(provider: P, retriever: Arc<ContextRetriever>) -> Self {
        Self {
            provider,
            retriever,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    #[must_use]
    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retrieval_limit = limit;
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer `user_message` using retrieved building-document context.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::Completion`] if the completion call fails or
    /// the model returns no text. Retrieval failures are not errors.
    pub async fn respond(&self, user_message: &str) -> Result<ChatMessage, ResponderError> {
        let context = self
            .retriever
            .retrieve(user_message, self.retrieval_limit)
            .await;

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(build_user_prompt(&context, user_message)),
        ];
        let content = self.provider.chat(&messages).await?;
        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.provider.name().to_owned(),
            }
            .into());
        }

        let sources = context.document_names();
        let confidence = context.best_similarity().unwrap_or(0.0);
        tracing::info!(
            context_chunks = context.len(),
            sources = sources.len(),
            confidence,
            "generated chat response"
        );

        Ok(ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content,
            timestamp: Utc::now(),
            sources: Some(sources),
            confidence: Some(confidence),
        })
    }
}
