use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvrank::auth::{SessionStore, UserStore};
use cvrank::config::Config;
use cvrank::extract::PdfTextExtractor;
use cvrank::llm_client::LlmClient;
use cvrank::routes::build_router;
use cvrank::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Rank v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.openai_model.clone(),
        config.openai_fallback_model.clone(),
    )?;
    info!(
        "LLM client initialized (model: {}, fallback: {})",
        llm.model(),
        config.openai_fallback_model
    );

    // Initialize the user store (hashes any plain-text passwords left in users.json)
    let users = UserStore::open(config.users_file(), config.password_hash_iterations).await?;
    info!("User store at {}", config.users_file().display());

    let sessions = SessionStore::new(config.session_ttl_hours);

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        users,
        sessions,
        extractor: Arc::new(PdfTextExtractor),
    };

    // Build router
    let app = build_router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
