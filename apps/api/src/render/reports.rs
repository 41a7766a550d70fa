//! Report bodies and report files for one analysis run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::analysis::models::{join_or_na, score_label, Candidate, ComparisonAnalysis};
use crate::errors::AppError;
use crate::render::pdf::render_pdf;
use crate::workspace::sanitize_filename;

const SEPARATOR: &str = "------------------------------------------------------------";

/// Text of a single candidate's report.
pub fn candidate_report_body(candidate: &Candidate, date: &str) -> String {
    let mut data = String::new();
    let eval = &candidate.evaluation;

    data.push_str(&format!("Date: {date}\n\n"));
    data.push_str(&format!("{}\n\n", candidate.profile));
    data.push_str(&format!("Skills: {}\n\n", join_or_na(&candidate.skills, ", ")));
    data.push_str(&format!("Pros: {}\n\n", join_or_na(&eval.pros, ", ")));
    data.push_str(&format!("Cons: {}\n\n", join_or_na(&eval.cons, ", ")));

    data.push_str("Experience:\n");
    for exp in &candidate.experience {
        data.push_str(&format!(
            "- Position: {}\n  Company: {}\n  Years of experience: {}\n",
            exp.position, exp.company, exp.years
        ));
    }

    data.push_str("\nEducation:\n");
    for edu in &candidate.education {
        data.push_str(&format!(
            "- Degree: {}\n  Institution: {}\n  Completion year: {}\n",
            edu.degree, edu.institution, edu.completion
        ));
    }

    data.push_str(&format!(
        "\nRecommended positions: {}\n",
        join_or_na(&candidate.recommended_positions, ", ")
    ));
    data.push_str(&format!(
        "Recommended industry: {}\n",
        candidate.recommended_industry
    ));
    data.push_str(&format!("MBTI: {}\n", candidate.mbti));
    data.push_str(&format!("MBTI explanation: {}\n", candidate.mbti_explanation));
    data.push_str(&format!("MBTI confidence: {}\n", candidate.mbti_confidence));
    if !candidate.suggested_courses.is_empty() {
        let courses: Vec<String> = candidate
            .suggested_courses
            .iter()
            .map(|c| format!("{} ({})", c.course, c.link))
            .collect();
        data.push_str(&format!("Suggested courses: {}\n", courses.join(", ")));
    }

    data.push_str("\nEvaluation:\n");
    data.push_str(&format!("- Score: {}\n", score_label(eval.score)));
    data.push_str(&format!("- Comments: {}\n\n", eval.comments));
    data.push_str(SEPARATOR);
    data
}

/// Text of the global comparison report.
pub fn global_report_body(
    file_names: &[String],
    job_position: Option<&str>,
    analysis: &ComparisonAnalysis,
    date: &str,
) -> String {
    let mut data = String::new();
    let position = job_position.filter(|p| !p.trim().is_empty()).unwrap_or("N/A");

    data.push_str(&format!("Date: {date}\n\n"));
    data.push_str(&format!("Target position: {position}\n\n"));

    data.push_str("Analyzed files:\n");
    for file in file_names {
        data.push_str(&format!("- {file}\n"));
    }

    data.push_str("\nCandidates:\n");
    for (i, candidate) in analysis.candidates.iter().enumerate() {
        data.push_str(&format!("{}. {}\n", i + 1, candidate.name));
    }
    data.push('\n');

    match &analysis.global {
        Some(global) => {
            data.push_str(&format!("Best CV: {}\n", global.best_cv));
            data.push_str(&format!("Worst CV: {}\n", global.worst_cv));
            data.push_str(&format!("Best CV reasons: {}\n", global.best_cv_reasons));
            data.push_str(&format!("Worst CV reasons: {}\n", global.worst_cv_reasons));
            data.push_str(&format!(
                "Most demanded skills: {}\n",
                join_or_na(&global.most_demanded_skills, ", ")
            ));
            data.push_str(&format!(
                "Least common skills: {}\n",
                join_or_na(&global.least_common_skills, ", ")
            ));
            data.push_str(&format!("Key differences: {}\n", global.key_differences));
        }
        None => data.push_str("Global comparison: N/A\n"),
    }

    if let Some(best) = &analysis.best_for_position {
        data.push_str(&format!(
            "\nBest for position: {}\nRecommended candidate: {}\nReasons: {}\n",
            best.position, best.recommended_candidate, best.reasons
        ));
    }

    data.push('\n');
    data.push_str(SEPARATOR);
    data
}

/// `<sanitized name>_analysis_<stamp>.pdf` per name, made unique within the run.
pub fn candidate_report_names(names: &[&str], stamp: &str) -> Vec<String> {
    let mut used = HashSet::new();
    names
        .iter()
        .map(|name| {
            let mut base = sanitize_filename(name);
            if base.is_empty() {
                base = "candidate".to_string();
            }
            let mut file_name = format!("{base}_analysis_{stamp}.pdf");
            let mut n = 2;
            while !used.insert(file_name.clone()) {
                file_name = format!("{base}_{n}_analysis_{stamp}.pdf");
                n += 1;
            }
            file_name
        })
        .collect()
}

pub fn global_report_name(stamp: &str) -> String {
    format!("global_report_{stamp}.pdf")
}

/// A report ready to be rendered: title, body and destination.
#[derive(Debug, Clone)]
pub struct ReportJob {
    pub title: String,
    pub body: String,
    pub path: PathBuf,
}

impl ReportJob {
    pub fn candidate(dir: &Path, file_name: &str, candidate: &Candidate, date: &str) -> Self {
        Self {
            title: format!("CV analysis - {}", sanitize_filename(&candidate.name)),
            body: candidate_report_body(candidate, date),
            path: dir.join(file_name),
        }
    }
}

/// Renders and writes all jobs on the blocking pool.
pub async fn write_reports(jobs: Vec<ReportJob>) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        for job in jobs {
            let bytes = render_pdf(&job.title, &job.body)?;
            std::fs::write(&job.path, bytes)
                .with_context(|| format!("Failed to write {}", job.path.display()))?;
        }
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Report rendering aborted: {e}")))??;
    Ok(())
}
