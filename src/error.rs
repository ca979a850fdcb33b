//! Error types for the chat service
//!
//! Every fallible operation returns [`Result`]; collaborator failures are
//! converted into a typed variant at the boundary where they occur, so a
//! failed load or ask never tears down the session that issued it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for session and pipeline failures
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration; fatal to the session instance
    #[error("configuration error: {0}")]
    Config(String),

    /// Document yielded no extractable text (e.g. scanned-image-only PDF)
    #[error("no extractable text in {0}")]
    EmptyDocument(String),

    /// Operation requires a loaded document
    #[error("no document loaded; load a document before asking")]
    NotReady,

    /// Embedding service failure (network, quota, malformed response)
    #[error("embedding service error: {0}")]
    Embedding(String),

    /// Generation service failure (network, quota, malformed response)
    #[error("generation service error: {0}")]
    Generation(String),

    /// Document bytes could not be parsed
    #[error("failed to parse {filename}: {message}")]
    FileParse { filename: String, message: String },

    /// File extension not handled by the parser
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Unknown session id on the HTTP surface
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Malformed request on the HTTP surface
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Stable error class name, exposed to API clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::EmptyDocument(_) => "empty_document",
            Self::NotReady => "not_ready",
            Self::Embedding(_) | Self::Generation(_) => "external_service",
            Self::FileParse { .. } => "file_parse",
            Self::UnsupportedFileType(_) => "unsupported_file_type",
            Self::SessionNotFound(_) => "session_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller can retry without reconstructing the session
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::EmptyDocument(_) | Self::FileParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotReady => StatusCode::CONFLICT,
            Self::Embedding(_) | Self::Generation(_) => StatusCode::BAD_GATEWAY,
            Self::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
            "recoverable": self.is_recoverable(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Config("x".into()).kind(), "configuration");
        assert_eq!(Error::NotReady.kind(), "not_ready");
        assert_eq!(Error::Embedding("x".into()).kind(), "external_service");
        assert_eq!(Error::Generation("x".into()).kind(), "external_service");
    }

    #[test]
    fn test_only_config_is_unrecoverable() {
        assert!(!Error::Config("missing token".into()).is_recoverable());
        assert!(Error::NotReady.is_recoverable());
        assert!(Error::EmptyDocument("doc.pdf".into()).is_recoverable());
        assert!(Error::Generation("timeout".into()).is_recoverable());
    }
}
