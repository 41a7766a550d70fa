pub mod download;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.limits.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route(
            "/login",
            get(auth::handle_login_page).post(auth::handle_login),
        )
        .route(
            "/register",
            get(auth::handle_register_page).post(auth::handle_register),
        )
        .route("/logout", get(auth::handle_logout))
        // Analysis
        .route("/", get(analysis::handle_upload_page))
        .route(
            "/analyze",
            post(analysis::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Rankings
        .route("/ranking", get(ranking::handle_ranking))
        .route("/api/rankings", get(ranking::handle_api_rankings))
        .route("/filtered_ranking", get(ranking::handle_filtered_ranking))
        // Files
        .route("/history", get(download::handle_history))
        .route("/download/:kind/:filename", get(download::handle_download))
        .with_state(state)
}
