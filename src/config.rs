//! Configuration for the chat service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variables checked (in order) for the generation credential
const TOKEN_ENV_VARS: &[&str] = &["HF_API_TOKEN", "HUGGINGFACEHUB_API_TOKEN"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index snapshot configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file: {}", e)))
    }

    /// Default configuration with the API token resolved from the environment
    ///
    /// Reads a `.env` file if one is present, then checks `HF_API_TOKEN` and
    /// `HUGGINGFACEHUB_API_TOKEN`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.resolve_token_from_env();
        config
    }

    /// Fill in `llm.api_token` from the environment if not already set
    pub fn resolve_token_from_env(&mut self) {
        if self.llm.api_token.is_some() {
            return;
        }
        let _ = dotenvy::dotenv();
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var) {
                if !token.trim().is_empty() {
                    self.llm.api_token = Some(token);
                    return;
                }
            }
        }
    }

    /// Validate the configuration
    ///
    /// Called eagerly at session construction so a missing credential is
    /// reported before any document work starts, not at first use.
    pub fn validate(&self) -> Result<()> {
        match &self.llm.api_token {
            Some(token) if !token.trim().is_empty() => {}
            _ => {
                return Err(Error::Config(format!(
                    "API token not set; export {} (or {})",
                    TOKEN_ENV_VARS[0], TOKEN_ENV_VARS[1]
                )))
            }
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// LLM (Hugging Face router) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible router base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API token; never written back to config files
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// Sampling temperature (0.0 = deterministic-leaning)
    pub temperature: f32,
    /// Maximum tokens in the generated answer
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/v1".to_string(),
            model: "openai/gpt-oss-120b".to_string(),
            api_token: None,
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Inference endpoint serving the feature-extraction pipeline
    pub endpoint: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding requests during ingestion
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://router.huggingface.co/hf-inference/models".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller trailing chunks are merged or dropped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Index snapshot configuration
///
/// Snapshots are a disposable cache: rebuilt on every load, namespaced per
/// session, and never required for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for index snapshots; each session writes under its own id
    pub snapshot_dir: PathBuf,
    /// Write a snapshot after each successful load
    pub persist_snapshots: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let snapshot_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdf-chat")
            .join("index");
        Self {
            snapshot_dir,
            persist_snapshots: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token() -> ChatConfig {
        let mut config = ChatConfig::default();
        config.llm.api_token = Some("hf_test_token".to_string());
        config
    }

    #[test]
    fn test_validate_requires_token() {
        let config = ChatConfig::default();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_validate_accepts_token() {
        assert!(config_with_token().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap_ge_chunk_size() {
        let mut config = config_with_token();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_match_pipeline_parameters() {
        let config = ChatConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.llm.temperature, 0.0);
    }
}
