//! Upload pipeline: store → extract → analyze → render reports → write ranking.
//!
//! Every file produced by one run shares the same stamp, so the results page, the
//! history page and the CSV can be matched up afterwards.

use bytes::Bytes;
use tracing::{info, warn};

use crate::analysis::analyzer::{analyze_compared_cv, analyze_cv, combine_cv_texts};
use crate::analysis::models::Candidate;
use crate::config::Limits;
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::ranking::csv_store::write_ranking;
use crate::ranking::{build_rows, sort_rows, RankingRow};
use crate::render::{
    candidate_report_names, global_report_body, global_report_name, write_reports, ReportJob,
};
use crate::state::AppState;
use crate::workspace::UserFolders;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Individual,
    Comparison,
}

impl AnalysisMode {
    /// `comparison` selects comparison mode; anything else is individual.
    pub fn from_form(value: &str) -> Self {
        if value.trim() == "comparison" {
            AnalysisMode::Comparison
        } else {
            AnalysisMode::Individual
        }
    }

    /// Checks an upload of `count` files against the limits. Comparison uploads are bound
    /// by `max_cvs_compare` and, like every upload, by `max_cvs`.
    pub fn check_file_count(&self, limits: &Limits, count: usize) -> Result<(), AppError> {
        if count == 0 {
            return Err(AppError::Validation("No files were uploaded.".to_string()));
        }
        if *self == AnalysisMode::Comparison && count > limits.max_cvs_compare {
            return Err(AppError::Validation(format!(
                "You can compare at most {} CVs at a time.",
                limits.max_cvs_compare
            )));
        }
        if count > limits.max_cvs {
            return Err(AppError::Validation(format!(
                "You can analyze at most {} CVs at a time.",
                limits.max_cvs
            )));
        }
        Ok(())
    }
}

/// One uploaded CV as received in the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Result of a run, enough to render the results page.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub mode: AnalysisMode,
    /// Sorted ranking rows; `pdf` links into the results folder.
    pub rows: Vec<RankingRow>,
    pub global_report: Option<String>,
    pub ranking_file: String,
}

/// File name plus extracted text (`None` when unreadable).
struct ExtractedCv {
    name: String,
    text: Option<String>,
}

/// Runs the whole pipeline for `files`. `stamp` names the output files, `date` is printed
/// in the reports.
pub async fn run_analysis(
    state: &AppState,
    folders: &UserFolders,
    mode: AnalysisMode,
    files: Vec<UploadedFile>,
    job_position: Option<&str>,
    stamp: &str,
    date: &str,
) -> Result<AnalysisOutcome, AppError> {
    mode.check_file_count(&state.config.limits, files.len())?;

    // Step 1: store uploads and extract their text
    let mut extracted = Vec::with_capacity(files.len());
    for file in files {
        let stored = folders.store_upload(&file.name, &file.bytes).await?;
        info!("Stored upload {} as {stored}", file.name);
        let text = extract_text(state.extractor.clone(), &file.name, file.bytes).await;
        if text.is_none() {
            warn!("No text extracted from {}", file.name);
        }
        extracted.push(ExtractedCv {
            name: file.name,
            text,
        });
    }

    // Step 2: analysis + reports
    let (mut rows, global_report) = match mode {
        AnalysisMode::Individual => {
            (run_individual(state, folders, &extracted, stamp, date).await?, None)
        }
        AnalysisMode::Comparison => {
            run_comparison(state, folders, &extracted, job_position, stamp, date).await?
        }
    };

    // Step 3: ranking CSV
    sort_rows(&mut rows);
    let ranking_file = write_ranking(&folders.rankings, stamp, &rows).await?;
    info!("Wrote ranking {ranking_file} with {} row(s)", rows.len());

    Ok(AnalysisOutcome {
        mode,
        rows,
        global_report,
        ranking_file,
    })
}

/// Analyzes each readable CV on its own. Rows are named after the uploaded file.
async fn run_individual(
    state: &AppState,
    folders: &UserFolders,
    extracted: &[ExtractedCv],
    stamp: &str,
    date: &str,
) -> Result<Vec<RankingRow>, AppError> {
    let mut analyzed: Vec<(&str, Candidate)> = Vec::new();
    let mut unreadable = Vec::new();

    for cv in extracted {
        match &cv.text {
            Some(text) => {
                let candidate = analyze_cv(&state.llm, &state.config.limits, text).await?;
                info!("Analyzed {} (score: {:?})", cv.name, candidate.evaluation.score);
                analyzed.push((cv.name.as_str(), candidate));
            }
            None => unreadable.push(RankingRow::unreadable(&cv.name)),
        }
    }

    let candidates: Vec<&Candidate> = analyzed.iter().map(|(_, c)| c).collect();
    let pdf_names = render_candidate_reports(folders, &candidates, stamp, date).await?;

    let mut rows: Vec<RankingRow> = analyzed
        .iter()
        .zip(&pdf_names)
        .map(|((file_name, candidate), pdf)| RankingRow {
            name: file_name.to_string(),
            ..RankingRow::from_candidate(candidate, pdf)
        })
        .collect();
    rows.extend(unreadable);
    Ok(rows)
}

/// Evaluates all readable CVs in one LLM call and renders the global report.
async fn run_comparison(
    state: &AppState,
    folders: &UserFolders,
    extracted: &[ExtractedCv],
    job_position: Option<&str>,
    stamp: &str,
    date: &str,
) -> Result<(Vec<RankingRow>, Option<String>), AppError> {
    let readable: Vec<(&str, &str)> = extracted
        .iter()
        .filter_map(|cv| cv.text.as_deref().map(|text| (cv.name.as_str(), text)))
        .collect();

    if readable.is_empty() {
        return Err(AppError::Extraction(
            "No text could be extracted from any of the uploaded files.".to_string(),
        ));
    }

    let file_names: Vec<String> = readable.iter().map(|(name, _)| name.to_string()).collect();
    let combined = combine_cv_texts(readable);
    let analysis =
        analyze_compared_cv(&state.llm, &state.config.limits, &combined, job_position).await?;
    info!(
        "Compared {} CV(s), model returned {} candidate(s)",
        file_names.len(),
        analysis.candidates.len()
    );

    let candidates: Vec<&Candidate> = analysis.candidates.iter().collect();
    let pdf_names = render_candidate_reports(folders, &candidates, stamp, date).await?;

    let global_name = global_report_name(stamp);
    write_reports(vec![ReportJob {
        title: format!("Global CV comparison - {date}"),
        body: global_report_body(&file_names, job_position, &analysis, date),
        path: folders.reports.join(&global_name),
    }])
    .await?;

    Ok((build_rows(&analysis.candidates, &pdf_names), Some(global_name)))
}

/// Renders one report per candidate into the results folder and returns the file names,
/// index-aligned with `candidates`.
async fn render_candidate_reports(
    folders: &UserFolders,
    candidates: &[&Candidate],
    stamp: &str,
    date: &str,
) -> Result<Vec<String>, AppError> {
    let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    let pdf_names = candidate_report_names(&names, stamp);

    let jobs = candidates
        .iter()
        .zip(&pdf_names)
        .map(|(candidate, file_name)| {
            ReportJob::candidate(&folders.results, file_name, candidate, date)
        })
        .collect();
    write_reports(jobs).await?;

    Ok(pdf_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_form() {
        assert_eq!(AnalysisMode::from_form("comparison"), AnalysisMode::Comparison);
        assert_eq!(AnalysisMode::from_form(" comparison "), AnalysisMode::Comparison);
        assert_eq!(AnalysisMode::from_form("individual"), AnalysisMode::Individual);
        assert_eq!(AnalysisMode::from_form(""), AnalysisMode::Individual);
        assert_eq!(AnalysisMode::from_form("Comparison"), AnalysisMode::Individual);
    }

    #[test]
    fn test_check_file_count() {
        let limits = Limits {
            max_cvs: 2,
            max_cvs_compare: 3,
            ..Default::default()
        };

        assert!(AnalysisMode::Individual.check_file_count(&limits, 2).is_ok());
        assert!(AnalysisMode::Individual.check_file_count(&limits, 0).is_err());
        assert!(AnalysisMode::Individual.check_file_count(&limits, 3).is_err());

        // Comparison is bound by both limits
        assert!(AnalysisMode::Comparison.check_file_count(&limits, 2).is_ok());
        match AnalysisMode::Comparison.check_file_count(&limits, 3) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("at most 2")),
            other => panic!("expected validation error, got {other:?}"),
        }
        match AnalysisMode::Comparison.check_file_count(&limits, 4) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("compare at most 3")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
