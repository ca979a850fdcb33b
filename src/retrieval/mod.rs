//! Chunk index and similarity search

pub mod index;

pub use index::{ChunkIndex, SearchResult};
