//! Session lifecycle, document upload, and question endpoints
//!
//! Handlers map 1:1 onto [`ChatSession`] operations. All failures come back
//! as in-band JSON errors via the `Error` response mapping; nothing here
//! terminates the process or tears down other sessions.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::query::AskRequest;
use crate::types::response::{
    AskResponse, DocumentSummary, HistoryResponse, LoadResponse, SessionCreated, SessionInfo,
};
use crate::types::SessionStatus;

/// POST /api/sessions - Create a new chat session
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>)> {
    let session_id = state.create_session()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id,
            status: SessionStatus::Initialized,
        }),
    ))
}

/// GET /api/sessions/:id - Session status
pub async fn session_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfo>> {
    let session = state.session(&id)?;
    let session = session.lock().await;

    Ok(Json(SessionInfo {
        session_id: id,
        status: session.status(),
        document: session.document().map(DocumentSummary::from),
        turns: session.history().len(),
    }))
}

/// DELETE /api/sessions/:id - Drop a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.remove_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/document - Upload and index a document
pub async fn load_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<LoadResponse>> {
    let session = state.session(&id)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("failed to read upload: {}", e)))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::InvalidRequest("no file in upload".to_string()))?;

    let mut session = session.lock().await;
    let summary = session.load(&filename, &data).await?;

    Ok(Json(LoadResponse {
        message: format!(
            "Loaded {}: {} pages, {} chunks indexed.",
            summary.filename, summary.pages, summary.chunks
        ),
        document_id: summary.document_id,
        pages: summary.pages,
        chunks: summary.chunks,
    }))
}

/// POST /api/sessions/:id/ask - Ask a question about the loaded document
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let session = state.session(&id)?;
    let mut session = session.lock().await;

    let answer = session.ask(&request.question).await?;

    Ok(Json(AskResponse {
        answer: answer.text,
        chunks_used: answer.chunks_used,
    }))
}

/// GET /api/sessions/:id/history - Transcript, oldest first
///
/// Presentation layers wanting newest-first reverse it themselves.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>> {
    let session = state.session(&id)?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        turns: session.history().to_vec(),
    }))
}

/// DELETE /api/sessions/:id/history - Clear the transcript
pub async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let session = state.session(&id)?;
    session.lock().await.clear_history();
    Ok(StatusCode::NO_CONTENT)
}
