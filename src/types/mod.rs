//! Shared types for documents, chunks, and the conversation transcript

pub mod chat;
pub mod document;
pub mod query;
pub mod response;

pub use chat::{Answer, ChatTurn, LoadSummary, SessionStatus};
pub use document::{Chunk, Document, FileType};
