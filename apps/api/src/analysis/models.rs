//! Normalized candidate model and the lenient JSON → model mapping.
//!
//! LLM answers drift: keys come back in English or in the Spanish of older prompts, lists
//! arrive as comma-separated strings, scores as `"85/100"`. Every accessor here takes a list
//! of key aliases and substitutes `N/A` (or an empty list) for anything missing.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experience {
    pub position: String,
    pub company: String,
    pub years: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub completion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub course: String,
    pub reason: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: Option<f64>,
    pub comments: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub profile: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub recommended_positions: Vec<String>,
    pub recommended_industry: String,
    pub mbti: String,
    pub mbti_explanation: String,
    pub mbti_confidence: String,
    pub suggested_courses: Vec<Course>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalComparison {
    pub best_cv: String,
    pub worst_cv: String,
    pub best_cv_reasons: String,
    pub worst_cv_reasons: String,
    pub most_demanded_skills: Vec<String>,
    pub least_common_skills: Vec<String>,
    pub key_differences: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestForPosition {
    pub position: String,
    pub recommended_candidate: String,
    pub reasons: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonAnalysis {
    pub candidates: Vec<Candidate>,
    pub global: Option<GlobalComparison>,
    pub best_for_position: Option<BestForPosition>,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Surfaces `{"error": "..."}` answers, which the prompts request for empty or corrupt CVs.
pub fn check_llm_error(value: &Value) -> Result<(), AppError> {
    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        return Err(AppError::Llm(format!("The model rejected the CV: {message}")));
    }
    Ok(())
}

/// Normalizes one candidate object. `index` is 0-based and only used for the
/// `Candidate {n}` fallback name.
pub fn normalize_candidate(value: &Value, index: usize) -> Candidate {
    let evaluation = field(value, &["evaluation", "evaluacion", "evaluación"]);

    let name = optional_text(value, &["name", "nombre"])
        .unwrap_or_else(|| format!("Candidate {}", index + 1));

    Candidate {
        name,
        profile: text(
            value,
            &["professional_profile", "profile", "perfil_profesional", "perfil"],
        ),
        skills: list(value, &["skills", "habilidades"]),
        experience: objects(value, &["experience", "experiencia"])
            .map(|exp| Experience {
                position: text(exp, &["position", "puesto"]),
                company: text(exp, &["company", "empresa"]),
                years: text(exp, &["years_experience", "years", "años_experiencia"]),
            })
            .collect(),
        education: objects(value, &["education", "educacion", "educación"])
            .map(|edu| Education {
                degree: text(edu, &["degree", "title", "titulo", "título"]),
                institution: text(edu, &["institution", "institucion", "institución"]),
                completion: text(edu, &["completion", "year", "finalizacion", "finalización"]),
            })
            .collect(),
        recommended_positions: list(
            value,
            &["recommended_positions", "recomendaciones_puestos"],
        ),
        recommended_industry: text(value, &["recommended_industry", "industria_recomendada"]),
        mbti: text(value, &["mbti", "MBTI"]),
        mbti_explanation: text(value, &["mbti_explanation", "MBTI_explicacion"]),
        mbti_confidence: text(value, &["mbti_confidence", "MBTI_confianza"]),
        suggested_courses: objects(value, &["suggested_courses", "cursos_sugeridos"])
            .map(|course| Course {
                course: text(course, &["course", "curso"]),
                reason: text(course, &["reason", "razon", "razón"]),
                link: text(course, &["link", "url"]),
            })
            .collect(),
        evaluation: Evaluation {
            score: evaluation
                .and_then(|e| field(e, &["score", "puntaje"]))
                .or_else(|| field(value, &["score", "puntaje"]))
                .and_then(parse_score),
            comments: evaluation
                .map(|e| text(e, &["comments", "comentarios"]))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            pros: evaluation
                .map(|e| list(e, &["pros"]))
                .unwrap_or_default(),
            cons: evaluation
                .map(|e| list(e, &["cons"]))
                .unwrap_or_default(),
        },
    }
}

/// Normalizes a comparison answer. Missing candidates is an error; missing global sections
/// are not.
pub fn normalize_comparison(value: &Value) -> Result<ComparisonAnalysis, AppError> {
    check_llm_error(value)?;

    let candidates = field(value, &["candidates", "candidatos"])
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            AppError::UnprocessableEntity(
                "No candidates were found in the analysis.".to_string(),
            )
        })?;

    let candidates: Vec<Candidate> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| normalize_candidate(c, i))
        .collect();

    let global = field(value, &["global_comparison", "comparacion_global"])
        .filter(|g| g.is_object())
        .map(|g| GlobalComparison {
            best_cv: text(g, &["best_cv", "mejor_cv"]),
            worst_cv: text(g, &["worst_cv", "peor_cv"]),
            best_cv_reasons: text(g, &["best_cv_reasons", "razones_mejor_cv"]),
            worst_cv_reasons: text(g, &["worst_cv_reasons", "razones_peor_cv"]),
            most_demanded_skills: list(
                g,
                &["most_demanded_skills", "habilidades_mas_demandadas"],
            ),
            least_common_skills: list(
                g,
                &["least_common_skills", "habilidades_menos_comunes"],
            ),
            key_differences: text(g, &["key_differences", "diferencias_claves"]),
        });

    let best_for_position = field(value, &["best_for_position", "mejor_para_puesto"])
        .filter(|b| b.is_object())
        .map(|b| BestForPosition {
            position: text(b, &["position", "puesto"]),
            recommended_candidate: text(b, &["recommended_candidate", "candidato_recomendado"]),
            reasons: text(b, &["reasons", "razones"]),
        });

    Ok(ComparisonAnalysis {
        candidates,
        global,
        best_for_position,
    })
}

/// Accepts `85`, `85.5`, `"85"`, `" 72.5 "`, `"85/100"`. Everything else is `None`.
pub fn parse_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let head = s.split('/').next().unwrap_or_default().trim();
            head.parse::<f64>().ok()
        }
        _ => None,
    }?;
    score.is_finite().then_some(score)
}

/// Score for display: `87`, `72.5` or `N/A`.
pub fn score_label(score: Option<f64>) -> String {
    match score {
        Some(s) if s.fract() == 0.0 => format!("{s:.0}"),
        Some(s) => format!("{s}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Joins list values for display, `N/A` when empty.
pub fn join_or_na(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(separator)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient accessors
// ────────────────────────────────────────────────────────────────────────────

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map: &Map<String, Value> = value.as_object()?;
    keys.iter()
        .find_map(|k| map.get(*k))
        .filter(|v| !v.is_null())
}

fn optional_text(value: &Value, keys: &[&str]) -> Option<String> {
    let rendered = match field(value, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!rendered.is_empty()).then_some(rendered)
}

fn text(value: &Value, keys: &[&str]) -> String {
    optional_text(value, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn list(value: &Value, keys: &[&str]) -> Vec<String> {
    match field(value, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn objects<'a>(value: &'a Value, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
    field(value, keys)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter(|v| v.is_object())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_score_variants() {
        assert_eq!(parse_score(&json!(85)), Some(85.0));
        assert_eq!(parse_score(&json!(72.5)), Some(72.5));
        assert_eq!(parse_score(&json!("85")), Some(85.0));
        assert_eq!(parse_score(&json!(" 72.5 ")), Some(72.5));
        assert_eq!(parse_score(&json!("85/100")), Some(85.0));
        assert_eq!(parse_score(&json!("N/A")), None);
        assert_eq!(parse_score(&json!("high")), None);
        assert_eq!(parse_score(&json!(null)), None);
        assert_eq!(parse_score(&json!([90])), None);
    }

    #[test]
    fn test_empty_candidate_gets_defaults() {
        let candidate = normalize_candidate(&json!({}), 2);
        assert_eq!(candidate.name, "Candidate 3");
        assert_eq!(candidate.profile, NOT_AVAILABLE);
        assert_eq!(candidate.mbti, NOT_AVAILABLE);
        assert!(candidate.skills.is_empty());
        assert!(candidate.experience.is_empty());
        assert_eq!(candidate.evaluation.score, None);
        assert_eq!(candidate.evaluation.comments, NOT_AVAILABLE);
    }

    #[test]
    fn test_english_schema() {
        let value = json!({
            "name": "Ana Gómez",
            "professional_profile": "Backend engineer",
            "skills": ["Rust", "Postgres"],
            "experience": [{ "position": "SRE", "company": "Acme", "years_experience": 3 }],
            "education": [{ "degree": "BSc CS", "institution": "UBA", "completion": "2015" }],
            "recommended_industry": "Fintech",
            "MBTI": "INTJ",
            "suggested_courses": [{ "course": "K8s", "reason": "ops", "link": "https://k8s.io" }],
            "evaluation": { "score": "91", "comments": "Strong", "pros": ["depth"], "cons": [] }
        });
        let c = normalize_candidate(&value, 0);
        assert_eq!(c.name, "Ana Gómez");
        assert_eq!(c.skills, vec!["Rust", "Postgres"]);
        assert_eq!(c.experience[0].years, "3");
        assert_eq!(c.education[0].institution, "UBA");
        assert_eq!(c.mbti, "INTJ");
        assert_eq!(c.suggested_courses[0].link, "https://k8s.io");
        assert_eq!(c.evaluation.score, Some(91.0));
        assert_eq!(c.evaluation.pros, vec!["depth"]);
        assert!(c.evaluation.cons.is_empty());
    }

    #[test]
    fn test_spanish_aliases() {
        let value = json!({
            "nombre": "Luis",
            "perfil_profesional": "Data analyst",
            "habilidades": "SQL, Python , ",
            "experiencia": [{ "puesto": "Analyst", "empresa": "Banco", "años_experiencia": "2" }],
            "educacion": [{ "titulo": "Lic.", "institucion": "UNAM", "finalizacion": "2019" }],
            "industria_recomendada": "Banca",
            "evaluacion": { "puntaje": 64, "comentarios": "Ok" }
        });
        let c = normalize_candidate(&value, 0);
        assert_eq!(c.name, "Luis");
        assert_eq!(c.skills, vec!["SQL", "Python"]);
        assert_eq!(c.experience[0].company, "Banco");
        assert_eq!(c.education[0].degree, "Lic.");
        assert_eq!(c.recommended_industry, "Banca");
        assert_eq!(c.evaluation.score, Some(64.0));
        assert_eq!(c.evaluation.comments, "Ok");
    }

    #[test]
    fn test_top_level_score_is_accepted() {
        let c = normalize_candidate(&json!({ "score": 77 }), 0);
        assert_eq!(c.evaluation.score, Some(77.0));
    }

    #[test]
    fn test_blank_name_falls_back() {
        let c = normalize_candidate(&json!({ "name": "   " }), 0);
        assert_eq!(c.name, "Candidate 1");
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let c = normalize_candidate(
            &json!({ "experience": ["loose string", { "position": "Dev" }] }),
            0,
        );
        assert_eq!(c.experience.len(), 1);
        assert_eq!(c.experience[0].company, NOT_AVAILABLE);
    }

    #[test]
    fn test_comparison_requires_candidates() {
        let err = normalize_comparison(&json!({ "global_comparison": {} })).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_comparison_error_answer() {
        let err = normalize_comparison(&json!({ "error": "CV is empty" })).unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_comparison_full() {
        let value = json!({
            "candidatos": [{ "nombre": "A" }, {}],
            "comparacion_global": {
                "mejor_cv": "A",
                "peor_cv": "Candidate 2",
                "habilidades_mas_demandadas": ["Rust"]
            },
            "mejor_para_puesto": { "puesto": "SRE", "candidato_recomendado": "A" }
        });
        let analysis = normalize_comparison(&value).unwrap();
        assert_eq!(analysis.candidates.len(), 2);
        assert_eq!(analysis.candidates[1].name, "Candidate 2");
        let global = analysis.global.unwrap();
        assert_eq!(global.best_cv, "A");
        assert_eq!(global.most_demanded_skills, vec!["Rust"]);
        assert_eq!(global.key_differences, NOT_AVAILABLE);
        let best = analysis.best_for_position.unwrap();
        assert_eq!(best.position, "SRE");
        assert_eq!(best.reasons, NOT_AVAILABLE);
    }

    #[test]
    fn test_join_or_na() {
        assert_eq!(join_or_na(&[], ", "), "N/A");
        assert_eq!(join_or_na(&["a".into(), "b".into()], ", "), "a, b");
    }
}
