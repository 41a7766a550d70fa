//! Ranking table: flat rows built from normalized candidates, sorting and filtering.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::models::{join_or_na, score_label, Candidate, NOT_AVAILABLE};

/// One ranking row. Flat so it round-trips through CSV unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub name: String,
    /// Empty in CSV when the model gave no usable score.
    pub score: Option<f64>,
    pub industry: String,
    pub mbti: String,
    pub mbti_explanation: String,
    pub mbti_confidence: String,
    pub suggested_courses: String,
    pub skills: String,
    pub pros: String,
    pub cons: String,
    pub professional_profile: String,
    pub experience: String,
    pub education: String,
    pub recommended_positions: String,
    /// File name of the candidate's PDF report in the results folder; empty when none.
    pub pdf: String,
}

impl RankingRow {
    pub fn from_candidate(candidate: &Candidate, pdf: &str) -> Self {
        let courses: Vec<String> = candidate
            .suggested_courses
            .iter()
            .map(|c| format!("{} ({})", c.course, c.link))
            .collect();
        let experience: Vec<String> = candidate
            .experience
            .iter()
            .map(|e| format!("{} - {} ({})", e.position, e.company, e.years))
            .collect();
        let education: Vec<String> = candidate
            .education
            .iter()
            .map(|e| format!("{} - {} ({})", e.degree, e.institution, e.completion))
            .collect();

        Self {
            name: candidate.name.clone(),
            score: candidate.evaluation.score,
            industry: candidate.recommended_industry.clone(),
            mbti: candidate.mbti.clone(),
            mbti_explanation: candidate.mbti_explanation.clone(),
            mbti_confidence: candidate.mbti_confidence.clone(),
            suggested_courses: join_or_na(&courses, ", "),
            skills: join_or_na(&candidate.skills, ", "),
            pros: join_or_na(&candidate.evaluation.pros, ", "),
            cons: join_or_na(&candidate.evaluation.cons, ", "),
            professional_profile: candidate.profile.clone(),
            experience: join_or_na(&experience, "; "),
            education: join_or_na(&education, "; "),
            recommended_positions: join_or_na(&candidate.recommended_positions, ", "),
            pdf: pdf.to_string(),
        }
    }

    /// Row for an uploaded file whose text could not be extracted.
    pub fn unreadable(file_name: &str) -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            name: file_name.to_string(),
            score: None,
            industry: na(),
            mbti: na(),
            mbti_explanation: na(),
            mbti_confidence: na(),
            suggested_courses: na(),
            skills: na(),
            pros: na(),
            cons: na(),
            professional_profile: na(),
            experience: na(),
            education: na(),
            recommended_positions: na(),
            pdf: String::new(),
        }
    }

    /// Score for display: `87`, `72.5` or `N/A`.
    pub fn score_label(&self) -> String {
        score_label(self.score)
    }
}

/// Builds rows for candidates. `pdf_names[i]` belongs to `candidates[i]`.
pub fn build_rows(candidates: &[Candidate], pdf_names: &[String]) -> Vec<RankingRow> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let pdf = pdf_names.get(i).map(String::as_str).unwrap_or_default();
            RankingRow::from_candidate(c, pdf)
        })
        .collect()
}

/// Highest score first; rows without a score go last. Stable for equal scores.
pub fn sort_rows(rows: &mut [RankingRow]) {
    rows.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Query-string filter for `/filtered_ranking`. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_score: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_score: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub skills: Option<String>,
}

impl RankingFilter {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 100.0;

    pub fn min(&self) -> f64 {
        self.min_score.unwrap_or(Self::DEFAULT_MIN)
    }

    pub fn max(&self) -> f64 {
        self.max_score.unwrap_or(Self::DEFAULT_MAX)
    }

    /// Rows without a score never match; industry is exact, skills a case-insensitive
    /// substring.
    pub fn matches(&self, row: &RankingRow) -> bool {
        let Some(score) = row.score else {
            return false;
        };
        if score < self.min() || score > self.max() {
            return false;
        }
        if let Some(industry) = &self.industry {
            if row.industry != *industry {
                return false;
            }
        }
        if let Some(skills) = &self.skills {
            if !row.skills.to_lowercase().contains(&skills.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[RankingRow]) -> Vec<RankingRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Empty or unparseable query values count as absent, so the filter falls back to its
/// defaults.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(s.parse::<T>().ok()),
    }
}
