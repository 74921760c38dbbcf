use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;

use nexus_core::ChatMessage;
use nexus_memory::document::{Document, DocumentStatus};

use super::error::ApiError;
use super::server::AppState;

#[derive(serde::Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(serde::Deserialize)]
pub(crate) struct ProcessRequest {
    pub document: Document,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    indexed_chunks: u64,
}

pub(crate) async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatMessage>, ApiError> {
    let Json(payload) = payload?;
    if payload.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    match state.responder.respond(&payload.message).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::error!("chat request failed: {e}");
            Err(ApiError::internal("Failed to generate response"))
        }
    }
}

pub(crate) async fn process_document_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<Document>, ApiError> {
    let Json(payload) = payload?;
    let mut pending = payload.document.clone();
    pending.status = DocumentStatus::Processing;
    pending.content = None;
    state.registry.upsert(pending).await;

    let processed = state.pipeline.process(payload.document).await;
    state.registry.upsert(processed.clone()).await;
    Ok(Json(processed))
}

pub(crate) async fn list_documents_handler(State(state): State<AppState>) -> Json<Vec<Document>> {
    Json(state.registry.list().await)
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let indexed_chunks = state.collection.count().await.unwrap_or_else(|e| {
        tracing::warn!("failed to count indexed chunks: {e}");
        0
    });
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        indexed_chunks,
    })
}
