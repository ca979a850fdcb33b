//! Chat server binary
//!
//! Run with: cargo run --bin pdf-chat-server

use pdf_chat::config::ChatConfig;
use pdf_chat::providers::{EmbeddingProvider, HfProvider};
use pdf_chat::server::ChatServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        PDF Chat                           ║
║        Ask questions about one uploaded document          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration: file if present, defaults otherwise; the API
    // token always comes from the environment
    let mut config = match std::env::var("PDF_CHAT_CONFIG") {
        Ok(path) => ChatConfig::from_file(&path)?,
        Err(_) if std::path::Path::new("pdf-chat.toml").exists() => {
            ChatConfig::from_file("pdf-chat.toml")?
        }
        Err(_) => ChatConfig::default(),
    };
    config.resolve_token_from_env();

    tracing::info!("configuration loaded");
    tracing::info!("  - generation model: {}", config.llm.model);
    tracing::info!("  - embedding model: {}", config.embeddings.model);
    tracing::info!("  - chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - top-k: {}", config.retrieval.top_k);

    config.validate()?;

    // Check that the inference router answers before accepting traffic
    let (embedder, _) = HfProvider::new(&config.llm, &config.embeddings)?.split();
    match embedder.health_check().await {
        Ok(true) => tracing::info!("inference router is reachable"),
        _ => {
            tracing::warn!("inference router not reachable at {}", config.llm.base_url);
            tracing::warn!("check your network and HF_API_TOKEN; requests will fail until it responds");
        }
    }

    let server = ChatServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST   /api/sessions               - Create a session");
    println!("  POST   /api/sessions/:id/document  - Upload a document");
    println!("  POST   /api/sessions/:id/ask       - Ask a question");
    println!("  GET    /api/sessions/:id/history   - Transcript");
    println!("  DELETE /api/sessions/:id/history   - Clear transcript");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
