//! Hugging Face router providers for embeddings and generation
//!
//! One shared HTTP client serves both provider traits: chat completions go
//! through the OpenAI-compatible router endpoint, embeddings through the
//! feature-extraction pipeline of the inference API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Shared HTTP client for the Hugging Face router
pub struct HfClient {
    http: reqwest::Client,
    base_url: String,
    embed_endpoint: String,
    api_token: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    normalize: bool,
}

impl HfClient {
    /// Create a new client from configuration
    ///
    /// Fails with a configuration error when no API token is set.
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        let api_token = llm
            .api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("API token not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            embed_endpoint: embeddings.endpoint.trim_end_matches('/').to_string(),
            api_token,
            max_retries: llm.max_retries,
        })
    }

    /// One chat completion call, retried on transient failures
    pub async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            max_tokens,
        };

        let body = self
            .post_with_retries(&url, &request, "generation")
            .await
            .map_err(|e| match e {
                Error::Internal(msg) => Error::Generation(msg),
                other => other,
            })?;

        let response: ChatResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::Generation(format!("malformed completion response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generation("no choices in completion response".to_string()))
    }

    /// Embed a batch of texts via the feature-extraction pipeline
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/{}/pipeline/feature-extraction",
            self.embed_endpoint, model
        );
        let request = EmbedRequest { inputs: texts, normalize: true };

        let body = self
            .post_with_retries(&url, &request, "embedding")
            .await
            .map_err(|e| match e {
                Error::Internal(msg) => Error::Embedding(msg),
                other => other,
            })?;

        let embeddings: Vec<Vec<f32>> = serde_json::from_slice(&body)
            .map_err(|e| Error::Embedding(format!("malformed embedding response: {}", e)))?;

        if embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }

    /// Check that the router answers authenticated requests
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        match self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// POST a JSON body, retrying transient failures with a short backoff
    ///
    /// Transient = connection/timeout errors, 429, and 5xx. Anything else
    /// fails immediately. Errors come back as `Error::Internal` for the
    /// caller to rewrap into its service-specific variant.
    async fn post_with_retries<T: Serialize>(
        &self,
        url: &str,
        request: &T,
        what: &str,
    ) -> Result<Vec<u8>> {
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!("retrying {} request (attempt {}): {}", what, attempt + 1, last_error);
                tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
            }

            let result = self
                .http
                .post(url)
                .bearer_auth(&self.api_token)
                .json(request)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .bytes()
                            .await
                            .map(|b| b.to_vec())
                            .map_err(|e| Error::Internal(format!("failed to read response: {}", e)));
                    }

                    let body = resp.text().await.unwrap_or_default();
                    last_error = format!("{} ({})", status, body);

                    let retryable = status == StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    if !retryable {
                        return Err(Error::Internal(last_error));
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::Internal(format!(
            "{} request failed after {} attempts: {}",
            what,
            self.max_retries + 1,
            last_error
        )))
    }
}

/// Embedding provider backed by the shared router client
pub struct HfEmbedder {
    client: Arc<HfClient>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl HfEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<HfClient>, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HfEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self.client.embed_batch(&self.model, &texts).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // The pipeline endpoint caps request sizes; send bounded batches
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.client.embed_batch(&self.model, batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "hf-feature-extraction"
    }
}

/// Generation provider backed by the shared router client
pub struct HfGenerator {
    client: Arc<HfClient>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HfGenerator {
    /// Create from an existing client
    pub fn from_client(client: Arc<HfClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for HfGenerator {
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
        let system = PromptBuilder::system_prompt(context);
        self.client
            .chat(&self.model, &system, question, self.temperature, self.max_tokens)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "hf-router"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Combined provider sharing one client for both embeddings and generation
pub struct HfProvider {
    embedder: HfEmbedder,
    generator: HfGenerator,
}

impl HfProvider {
    /// Create a new combined provider
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        let client = Arc::new(HfClient::new(llm, embeddings)?);
        Ok(Self {
            embedder: HfEmbedder::from_client(Arc::clone(&client), embeddings),
            generator: HfGenerator::from_client(client, llm),
        })
    }

    /// Split into separate providers
    pub fn split(self) -> (HfEmbedder, HfGenerator) {
        (self.embedder, self.generator)
    }
}
