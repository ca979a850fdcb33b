//! Document ingestion: parsing and chunking

pub mod chunker;
pub mod parser;

pub use chunker::TextChunker;
pub use parser::{FileParser, PageContent, ParsedDocument};
