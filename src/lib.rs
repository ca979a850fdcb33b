//! pdf-chat: question answering over a single uploaded document
//!
//! Upload a PDF (or plain text), ingest it into a similarity-searchable
//! index, and answer natural-language questions from its content with an
//! LLM. One document and one transcript per session; loading a new document
//! replaces the index and resets the transcript.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use session::ChatSession;
pub use types::{
    chat::{Answer, ChatTurn, LoadSummary, SessionStatus},
    document::{Chunk, Document, FileType},
};
