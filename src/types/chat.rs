//! Conversation transcript and session lifecycle types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question/answer pair in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// The question as asked
    pub question: String,
    /// The generated answer
    pub answer: String,
    /// Number of retrieved chunks that backed the answer
    pub chunks_used: usize,
    /// When the question was answered
    pub asked_at: chrono::DateTime<chrono::Utc>,
}

/// Result of a successful document load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Id of the freshly ingested document
    pub document_id: Uuid,
    /// Original filename
    pub filename: String,
    /// Number of pages extracted
    pub pages: u32,
    /// Number of chunks indexed
    pub chunks: u32,
}

/// Result of a successful ask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text
    pub text: String,
    /// Number of retrieved chunks included in the prompt
    pub chunks_used: usize,
}

/// Lifecycle state of a session
///
/// A session is `Initialized` from construction until its first successful
/// load, `Ready` from then on. There is no transition back; dropping the
/// session is the only way out of `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Providers constructed, no document loaded yet
    Initialized,
    /// A document is loaded and questions can be asked
    Ready,
}
