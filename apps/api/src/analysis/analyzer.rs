//! LLM-backed CV analysis: size checks, prompt assembly, normalization.

use serde_json::Value;

use crate::analysis::models::{check_llm_error, normalize_candidate, normalize_comparison};
use crate::analysis::models::{Candidate, ComparisonAnalysis};
use crate::analysis::prompts::{COMPARISON_PROMPT_TEMPLATE, INDIVIDUAL_PROMPT_TEMPLATE, NO_POSITION};
use crate::config::Limits;
use crate::errors::AppError;
use crate::llm_client::prompts::{CV_EXPERT_SYSTEM, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::LlmClient;

/// Builds the single-CV prompt. CV text is substituted last so it cannot inject placeholders.
pub fn individual_prompt(cv_text: &str) -> String {
    INDIVIDUAL_PROMPT_TEMPLATE
        .replace("{untrusted_input_instruction}", UNTRUSTED_INPUT_INSTRUCTION)
        .replace("{cv_text}", cv_text)
}

/// Builds the comparison prompt over the combined CV texts.
pub fn comparison_prompt(combined_text: &str, job_position: Option<&str>) -> String {
    let position = job_position
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(NO_POSITION);
    COMPARISON_PROMPT_TEMPLATE
        .replace("{untrusted_input_instruction}", UNTRUSTED_INPUT_INSTRUCTION)
        .replace("{job_position}", position)
        .replace("{cv_text}", combined_text)
}

/// Analyzes one CV on its own.
pub async fn analyze_cv(
    llm: &LlmClient,
    limits: &Limits,
    cv_text: &str,
) -> Result<Candidate, AppError> {
    if cv_text.chars().count() > limits.max_chars_per_cv {
        return Err(AppError::Validation(format!(
            "CV too long: it exceeds the limit of {} characters.",
            limits.max_chars_per_cv
        )));
    }

    let value: Value = llm
        .call_json(&individual_prompt(cv_text), CV_EXPERT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("CV analysis failed: {e}")))?;

    check_llm_error(&value)?;
    Ok(normalize_candidate(&value, 0))
}

/// Analyzes several CVs in one call and compares them.
pub async fn analyze_compared_cv(
    llm: &LlmClient,
    limits: &Limits,
    combined_text: &str,
    job_position: Option<&str>,
) -> Result<ComparisonAnalysis, AppError> {
    if combined_text.chars().count() > limits.max_chars_combined() {
        return Err(AppError::Validation(format!(
            "Combined CVs too long: they exceed the limit of {} characters.",
            limits.max_chars_combined()
        )));
    }

    let value: Value = llm
        .call_json(
            &comparison_prompt(combined_text, job_position),
            CV_EXPERT_SYSTEM,
        )
        .await
        .map_err(|e| AppError::Llm(format!("CV comparison failed: {e}")))?;

    normalize_comparison(&value)
}

/// Joins CV texts the way the comparison prompt expects them.
pub fn combine_cv_texts<'a>(texts: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    texts
        .into_iter()
        .map(|(file_name, text)| format!("CV: {file_name}\n{text}"))
        .collect::<Vec<_>>()
        .join("\n")
}
