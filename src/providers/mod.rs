//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams keep the pipeline independent of the backing inference
//! service; the default implementation talks to the Hugging Face router.

pub mod embedding;
pub mod hf;
pub mod llm;

pub use embedding::EmbeddingProvider;
pub use hf::{HfClient, HfEmbedder, HfGenerator, HfProvider};
pub use llm::LlmProvider;
