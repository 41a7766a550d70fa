//! Axum route handlers for the ranking pages and the JSON ranking API.

use std::collections::BTreeSet;

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::analysis::models::NOT_AVAILABLE;
use crate::auth::{ApiUser, CurrentUser};
use crate::errors::{ApiError, AppError};
use crate::ranking::csv_store::{list_rankings, load_ranking};
use crate::ranking::{RankingFilter, RankingRow};
use crate::state::AppState;
use crate::views;
use crate::workspace::UserFolders;

/// `?file=` selects a ranking CSV; the newest one is used when absent.
#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub file: Option<String>,
}

/// GET /ranking
pub async fn handle_ranking(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RankingQuery>,
) -> Result<Html<String>, AppError> {
    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let (file_name, rows) = load_ranking(&folders, query.file.as_deref()).await?;
    let available = list_rankings(&folders).await?;

    Ok(Html(views::ranking::ranking_page(
        &user, &file_name, &rows, &available,
    )))
}

/// GET /api/rankings
///
/// The ranking rows as a JSON array, in ranking order.
pub async fn handle_api_rankings(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<RankingRow>>, ApiError> {
    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let (_, rows) = load_ranking(&folders, query.file.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /filtered_ranking
pub async fn handle_filtered_ranking(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RankingQuery>,
    Query(filter): Query<RankingFilter>,
) -> Result<Html<String>, AppError> {
    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let (file_name, rows) = load_ranking(&folders, query.file.as_deref()).await?;

    let industries = industries(&rows);
    let filtered = filter.apply(&rows);

    Ok(Html(views::ranking::filtered_page(
        &user,
        &file_name,
        &filter,
        &industries,
        &filtered,
    )))
}

/// Distinct industries present in `rows`, for the filter drop-down.
fn industries(rows: &[RankingRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.industry.trim())
        .filter(|i| !i.is_empty() && *i != NOT_AVAILABLE)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
