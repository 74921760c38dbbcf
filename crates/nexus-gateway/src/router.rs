use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat_handler, health_handler, list_documents_handler, process_document_handler,
};
use super::server::AppState;

pub(crate) fn build_router(state: AppState, max_body_size: usize) -> Router {
    let api = Router::new()
        .route("/chat/message", post(chat_handler))
        .route("/documents", get(list_documents_handler))
        .route("/documents/process", post(process_document_handler))
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
