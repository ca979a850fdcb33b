//! API routes for the chat server

pub mod sessions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Session lifecycle
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:id", get(sessions::session_info))
        .route("/sessions/:id", delete(sessions::delete_session))
        // Document upload - with larger body limit
        .route(
            "/sessions/:id/document",
            post(sessions::load_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Question answering
        .route("/sessions/:id/ask", post(sessions::ask))
        // Transcript
        .route("/sessions/:id/history", get(sessions::history))
        .route("/sessions/:id/history", delete(sessions::clear_history))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "pdf-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over a single uploaded document",
        "endpoints": {
            "POST /api/sessions": "Create a chat session",
            "GET /api/sessions/:id": "Session status",
            "DELETE /api/sessions/:id": "Drop a session",
            "POST /api/sessions/:id/document": "Upload and index a document",
            "POST /api/sessions/:id/ask": "Ask a question about the loaded document",
            "GET /api/sessions/:id/history": "Transcript, oldest first",
            "DELETE /api/sessions/:id/history": "Clear the transcript"
        }
    }))
}
