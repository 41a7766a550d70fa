// CV analysis prompt templates.
// Placeholders are replaced with `str::replace`; keep them unique.

pub const INDIVIDUAL_PROMPT_TEMPLATE: &str = r#"Analyze the following CV and return a summary as a JSON object with exactly this structure:

{
  "name": "Candidate name (if available)",
  "professional_profile": "Summary of the professional profile",
  "skills": ["Key skills"],
  "evaluation": {
    "score": "Score between 1 and 100",
    "comments": "Comments about the quality of the CV"
  }
}

{untrusted_input_instruction}

CV:
{cv_text}"#;

pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"You are a CV analysis expert whose goal is to extract key information for recruiting decisions. You will receive several CVs as plain text. Analyze each one individually and compare them with each other. You MUST return data for every CV provided, because the candidates will be ranked afterwards.

Also identify which candidate best fits the target position, if one is provided.

Target position: {job_position}

Required JSON format:

{
  "candidates": [
    {
      "name": "Candidate name (if available)",
      "professional_profile": "Short summary of the candidate and their specialization",
      "experience": [
        {
          "position": "Job title",
          "company": "Company name",
          "years_experience": "Approximate years in that position"
        }
      ],
      "skills": ["Key skills extracted from the CV"],
      "education": [
        {
          "degree": "Degree obtained",
          "institution": "Educational institution",
          "completion": "Completion year (if available)"
        }
      ],
      "recommended_positions": ["Positions suited to the profile"],
      "recommended_industry": "Industry suggested by experience and skills",
      "mbti": "MBTI personality type based only on the available information, inventing nothing",
      "mbti_explanation": "Detailed explanation of how the MBTI type was determined",
      "mbti_confidence": "Confidence level of the MBTI determination",
      "suggested_courses": [
        { "course": "Course that would improve the profile", "reason": "Why it is suggested", "link": "Link to the course" }
      ],
      "evaluation": {
        "score": "Score between 1 and 100 based on relevance, clarity and comparison with the other CVs",
        "comments": "Brief comment on the quality of the CV",
        "pros": ["Strengths of the CV, also compared with the others"],
        "cons": ["Weaknesses of the CV, also compared with the others"]
      }
    }
  ],
  "global_comparison": {
    "best_cv": "Name of the candidate with the strongest CV overall",
    "worst_cv": "Name of the candidate with the least competitive CV",
    "best_cv_reasons": "Key reasons why that CV is the best",
    "worst_cv_reasons": "Main weaknesses of the lowest-rated CV",
    "most_demanded_skills": ["Valuable skills that appear in several CVs"],
    "least_common_skills": ["Skills that appear in few CVs but can differentiate"],
    "key_differences": "Summary of the most notable differences between the CVs"
  },
  "best_for_position": {
    "position": "Position evaluated",
    "recommended_candidate": "Name of the best candidate for this position",
    "reasons": "Key reasons why this candidate is the best fit compared with the others"
  }
}

{untrusted_input_instruction}

Data of all CVs:
{cv_text}"#;

/// Placeholder used when no target position was submitted.
pub const NO_POSITION: &str = "not specified";
