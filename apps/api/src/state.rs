use std::sync::Arc;

use crate::auth::{SessionStore, UserStore};
use crate::config::Config;
use crate::extract::TextExtractor;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: LlmClient,
    pub users: UserStore,
    pub sessions: SessionStore,
    /// Pluggable text extractor. Default: PdfTextExtractor.
    pub extractor: Arc<dyn TextExtractor>,
}
