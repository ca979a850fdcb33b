//! Chat session over a single loaded document
//!
//! A [`ChatSession`] owns the providers, the current document's index, and
//! the conversation transcript. Construction validates configuration
//! eagerly; loading replaces the index wholesale and resets the transcript;
//! asking answers from the current index only. Failed operations never
//! change session state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::{FileParser, TextChunker};
use crate::providers::{EmbeddingProvider, HfProvider, LlmProvider};
use crate::retrieval::ChunkIndex;
use crate::types::{Answer, ChatTurn, Document, LoadSummary, SessionStatus};

/// One user's conversational session
pub struct ChatSession {
    session_id: Uuid,
    config: ChatConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn LlmProvider>,
    index: Option<ChunkIndex>,
    document: Option<Document>,
    transcript: Vec<ChatTurn>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("session_id", &self.session_id)
            .field("config", &self.config)
            .field("embedder", &self.embedder.name())
            .field("generator", &self.generator.name())
            .field("index", &self.index)
            .field("document", &self.document)
            .field("transcript", &self.transcript)
            .finish()
    }
}

impl ChatSession {
    /// Create a session with the default Hugging Face providers
    ///
    /// Configuration is validated here, not at first use, so a missing
    /// credential surfaces immediately as `Error::Config`.
    pub fn new(config: ChatConfig) -> Result<Self> {
        config.validate()?;
        let (embedder, generator) =
            HfProvider::new(&config.llm, &config.embeddings)?.split();
        Ok(Self::with_providers(
            config,
            Arc::new(embedder),
            Arc::new(generator),
        ))
    }

    /// Create a session with explicit providers
    pub fn with_providers(
        config: ChatConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LlmProvider>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(
            %session_id,
            embedder = embedder.name(),
            dimensions = embedder.dimensions(),
            llm = generator.name(),
            model = generator.model(),
            "session initialized"
        );
        Self {
            session_id,
            config,
            embedder,
            generator,
            index: None,
            document: None,
            transcript: Vec::new(),
        }
    }

    /// Session id, also the namespace for index snapshots
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// True once a document has been successfully loaded
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Lifecycle status derived from readiness
    pub fn status(&self) -> SessionStatus {
        if self.is_ready() {
            SessionStatus::Ready
        } else {
            SessionStatus::Initialized
        }
    }

    /// Metadata of the currently loaded document, if any
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The transcript, oldest turn first
    pub fn history(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Empty the transcript; the loaded index is untouched
    pub fn clear_history(&mut self) {
        self.transcript.clear();
    }

    /// Load a document from raw bytes, replacing any previously loaded one
    ///
    /// Parse, chunk, embed, and index into locals first; session state is
    /// only assigned once every step has succeeded, so a failed load leaves
    /// the previous document, index, and transcript intact.
    pub async fn load(&mut self, filename: &str, data: &[u8]) -> Result<LoadSummary> {
        tracing::info!(%filename, bytes = data.len(), "loading document");

        let parsed = FileParser::parse(filename, data)?;

        let mut document = Document::new(
            filename.to_string(),
            parsed.file_type.clone(),
            parsed.content_hash.clone(),
            data.len() as u64,
        );
        document.total_pages = parsed.total_pages;

        let chunker = TextChunker::new(&self.config.chunking);
        let mut chunks = chunker.chunk_document(document.id, &parsed);
        if chunks.is_empty() {
            return Err(Error::EmptyDocument(filename.to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let index = ChunkIndex::build(document.id, chunks)?;
        document.total_chunks = index.len() as u32;

        if self.config.storage.persist_snapshots {
            let path = self.snapshot_path();
            if let Err(e) = index.save(&path) {
                tracing::warn!("failed to write index snapshot to {}: {}", path.display(), e);
            }
        }

        let pages = parsed.total_pages.unwrap_or(parsed.pages.len() as u32);
        let summary = LoadSummary {
            document_id: document.id,
            filename: document.filename.clone(),
            pages,
            chunks: document.total_chunks,
        };

        // Commit: replace the index and start a fresh transcript, so no
        // answer can be attributed to the wrong document
        self.index = Some(index);
        self.document = Some(document);
        self.transcript.clear();

        tracing::info!(
            file_type = parsed.file_type.display_name(),
            pages = summary.pages,
            chunks = summary.chunks,
            "document loaded"
        );
        Ok(summary)
    }

    /// Load a document from a file path
    pub async fn load_path(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::InvalidRequest(format!("not a file path: {}", path.display())))?;
        let data = tokio::fs::read(path).await?;
        self.load(&filename, &data).await
    }

    /// Answer a question from the currently loaded document
    ///
    /// Each question is answered independently: the transcript is kept for
    /// display, but no prior turns are passed to the model.
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("question is empty".to_string()));
        }

        let index = self.index.as_ref().ok_or(Error::NotReady)?;

        let query_embedding = self.embedder.embed(question).await?;
        let results = index.search(&query_embedding, self.config.retrieval.top_k);
        let context = PromptBuilder::build_context(&results);

        let answer_text = self.generator.generate_answer(question, &context).await?;

        self.transcript.push(ChatTurn {
            question: question.to_string(),
            answer: answer_text.clone(),
            chunks_used: results.len(),
            asked_at: chrono::Utc::now(),
        });

        tracing::info!(chunks_used = results.len(), turns = self.transcript.len(), "question answered");
        Ok(Answer {
            text: answer_text,
            chunks_used: results.len(),
        })
    }

    /// Path of this session's index snapshot
    fn snapshot_path(&self) -> PathBuf {
        self.config
            .storage
            .snapshot_dir
            .join(self.session_id.to_string())
            .join("index.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Deterministic embedder: hashes bytes into a fixed-size vector
    struct StubEmbedder {
        dims: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; self.dims];
            for (i, b) in text.bytes().enumerate() {
                v[i % self.dims] += f32::from(b) / 255.0;
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stub-embedder"
        }
    }

    /// Generator that can be flipped into a failing state
    struct StubGenerator {
        fail: AtomicBool,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self { fail: AtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl LlmProvider for StubGenerator {
        async fn generate_answer(&self, question: &str, _context: &str) -> Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Generation("service unavailable".to_string()));
            }
            Ok(format!("answer to: {}", question))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stub-llm"
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn test_config() -> ChatConfig {
        let mut config = ChatConfig::default();
        config.storage.persist_snapshots = false;
        config
    }

    fn session_with(generator: StubGenerator) -> ChatSession {
        ChatSession::with_providers(
            test_config(),
            Arc::new(StubEmbedder { dims: 8 }),
            Arc::new(generator),
        )
    }

    fn session() -> ChatSession {
        session_with(StubGenerator::new())
    }

    const DOC: &[u8] = b"Rust is a systems programming language. \
        It guarantees memory safety without garbage collection. \
        The borrow checker enforces ownership rules at compile time.";

    #[test]
    fn test_new_without_token_fails_with_configuration_error() {
        let err = ChatSession::new(test_config()).unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_session_starts_initialized_and_not_ready() {
        let session = session();
        assert!(!session.is_ready());
        assert_eq!(session.status(), SessionStatus::Initialized);
        assert!(session.document().is_none());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_ask_before_load_fails_with_not_ready() {
        let mut session = session();
        let err = session.ask("What is Rust?").await.unwrap_err();
        assert_eq!(err.kind(), "not_ready");
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_load_reports_counts_and_sets_ready() {
        let mut session = session();
        let summary = session.load("rust.txt", DOC).await.unwrap();

        assert_eq!(summary.pages, 1);
        assert!(summary.chunks >= 1);
        assert!(session.is_ready());
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.document().unwrap().filename, "rust.txt");
    }

    #[tokio::test]
    async fn test_ask_appends_exactly_one_turn() {
        let mut session = session();
        session.load("rust.txt", DOC).await.unwrap();

        let answer = session.ask("What is Rust?").await.unwrap();
        assert!(answer.chunks_used >= 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].question, "What is Rust?");

        session.ask("What enforces ownership?").await.unwrap();
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_ask_leaves_transcript_unchanged() {
        let generator = Arc::new(StubGenerator::new());
        let mut session = ChatSession::with_providers(
            test_config(),
            Arc::new(StubEmbedder { dims: 8 }),
            generator.clone(),
        );
        session.load("rust.txt", DOC).await.unwrap();
        session.ask("first question").await.unwrap();
        assert_eq!(session.history().len(), 1);

        generator.fail.store(true, Ordering::SeqCst);
        let err = session.ask("second question").await.unwrap_err();
        assert_eq!(err.kind(), "external_service");
        assert_eq!(session.history().len(), 1);
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_load_resets_transcript() {
        let mut session = session();
        session.load("first.txt", DOC).await.unwrap();
        session.ask("a question").await.unwrap();
        assert_eq!(session.history().len(), 1);

        session
            .load("second.txt", b"A different document about compilers and parsing.")
            .await
            .unwrap();
        assert!(session.history().is_empty());
        assert_eq!(session.document().unwrap().filename, "second.txt");
    }

    #[tokio::test]
    async fn test_failed_load_preserves_previous_state() {
        let mut session = session();
        session.load("rust.txt", DOC).await.unwrap();
        session.ask("a question").await.unwrap();

        let err = session.load("blank.txt", b"   ").await.unwrap_err();
        assert_eq!(err.kind(), "empty_document");

        // Prior document, readiness, and transcript all intact
        assert!(session.is_ready());
        assert_eq!(session.document().unwrap().filename, "rust.txt");
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_load_stays_not_ready() {
        let mut session = session();
        let err = session.load("blank.txt", b"\n\t ").await.unwrap_err();
        assert_eq!(err.kind(), "empty_document");
        assert!(!session.is_ready());
        assert_eq!(session.status(), SessionStatus::Initialized);
    }

    #[tokio::test]
    async fn test_clear_history_keeps_index() {
        let mut session = session();
        session.load("rust.txt", DOC).await.unwrap();
        session.ask("one").await.unwrap();
        session.ask("two").await.unwrap();

        session.clear_history();
        assert!(session.history().is_empty());
        assert!(session.is_ready());

        // Still answerable after clearing
        session.ask("three").await.unwrap();
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected_without_transcript_change() {
        let mut session = session();
        session.load("rust.txt", DOC).await.unwrap();

        let err = session.ask("   ").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_written_under_session_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.storage.persist_snapshots = true;
        config.storage.snapshot_dir = dir.path().to_path_buf();

        let mut session = ChatSession::with_providers(
            config,
            Arc::new(StubEmbedder { dims: 8 }),
            Arc::new(StubGenerator::new()),
        );
        session.load("rust.txt", DOC).await.unwrap();

        let snapshot = dir
            .path()
            .join(session.session_id().to_string())
            .join("index.json");
        assert!(snapshot.exists());

        let index = ChunkIndex::load(&snapshot).unwrap();
        assert_eq!(index.len() as u32, session.document().unwrap().total_chunks);
    }
}
