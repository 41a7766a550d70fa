//! Downloads from the user's namespace and the history page.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::ranking::csv_store::list_rankings;
use crate::state::AppState;
use crate::views;
use crate::workspace::{FolderKind, UserFolders};

const GLOBAL_REPORT_PREFIX: &str = "global_report_";

/// GET /download/:kind/:filename
///
/// Sends a report or ranking file as an attachment. Unknown kinds, unsafe names and
/// missing files are all 404.
pub async fn handle_download(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((kind, file_name)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let kind: FolderKind = kind.parse()?;
    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let path = folders.resolve(kind, &file_name).await?;
    let bytes = tokio::fs::read(&path).await?;

    info!(
        "User {} downloaded {}/{file_name}",
        user.username,
        kind.as_str()
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&file_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(r#"attachment; filename="{}""#, file_name.replace('"', "")),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /history
pub async fn handle_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, AppError> {
    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let rankings = list_rankings(&folders).await?;
    let reports = folders
        .list(FolderKind::Reports, GLOBAL_REPORT_PREFIX)
        .await?;

    Ok(Html(views::ranking::history_page(&user, &rankings, &reports)))
}

fn content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "csv" => "text/csv; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type("Ana_analysis_1.pdf"), "application/pdf");
        assert_eq!(content_type("cv_ranking_1.CSV"), "text/csv; charset=utf-8");
        assert_eq!(content_type("README"), "application/octet-stream");
    }
}
