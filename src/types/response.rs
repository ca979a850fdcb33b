//! Response types for the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::{ChatTurn, SessionStatus};
use super::document::{Document, FileType};

/// Response to session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    /// Id to use in all subsequent calls for this session
    pub session_id: Uuid,
    /// Initial status (always `initialized`)
    pub status: SessionStatus,
}

/// Summary of the loaded document, exposed in status responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub file_type: FileType,
    pub pages: Option<u32>,
    pub chunks: u32,
    pub file_size: u64,
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            file_type: doc.file_type.clone(),
            pages: doc.total_pages,
            chunks: doc.total_chunks,
            file_size: doc.file_size,
            ingested_at: doc.ingested_at,
        }
    }
}

/// Session status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub status: SessionStatus,
    /// Currently loaded document, if any
    pub document: Option<DocumentSummary>,
    /// Number of turns in the transcript
    pub turns: usize,
}

/// Response to a successful document load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResponse {
    /// One-line human-readable summary for the UI status panel
    pub message: String,
    pub document_id: Uuid,
    pub pages: u32,
    pub chunks: u32,
}

/// Response to a successful ask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Number of retrieved chunks included in the prompt
    pub chunks_used: usize,
}

/// Transcript response, oldest turn first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<ChatTurn>,
}
