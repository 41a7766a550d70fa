//! Axum route handlers for the upload page and the analysis pipeline.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    response::Html,
};
use chrono::Local;
use tracing::info;

use crate::analysis::pipeline::{run_analysis, AnalysisMode, UploadedFile};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::views;
use crate::workspace::UserFolders;

/// Fields of the `/analyze` multipart form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    analysis_type: String,
    job_position: Option<String>,
    files: Vec<UploadedFile>,
}

/// GET /
pub async fn handle_upload_page(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Html<String> {
    Html(views::analysis::upload_page(&user, &state.config.limits))
}

/// POST /analyze
///
/// Stores the uploaded CVs, runs the analysis and renders the results page.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let form = read_form(multipart).await?;
    let mode = AnalysisMode::from_form(&form.analysis_type);
    info!(
        "User {} uploaded {} file(s) for {:?} analysis",
        user.username,
        form.files.len(),
        mode
    );

    let folders = UserFolders::ensure(&state.config.data_dir, &user.username).await?;
    let now = Local::now();
    let stamp = now.format("%Y%m%d%H%M%S").to_string();
    let date = now.format("%d/%m/%Y %H:%M").to_string();

    let outcome = run_analysis(
        &state,
        &folders,
        mode,
        form.files,
        form.job_position.as_deref(),
        &stamp,
        &date,
    )
    .await?;

    Ok(Html(views::analysis::results_page(&user, &outcome)))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "analysis_type" => form.analysis_type = field.text().await.map_err(invalid_upload)?,
            "job_position" => {
                let position = field.text().await.map_err(invalid_upload)?;
                let position = position.trim();
                if !position.is_empty() {
                    form.job_position = Some(position.to_string());
                }
            }
            "cv_files" => {
                // Browsers send an empty part when no file was picked.
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                if !name.is_empty() {
                    form.files.push(UploadedFile { name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn invalid_upload(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid upload: {}", e.body_text()))
}
