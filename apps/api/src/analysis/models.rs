use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of screening a résumé against a target role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScreeningResult {
    pub match_score: f64, // 0 – 100
    #[serde(default)]
    pub tech_skills_found: Vec<String>,
    #[serde(default)]
    pub soft_skills_found: Vec<String>,
    #[serde(default)]
    pub missing_tech_skills: Vec<String>,
    #[serde(default)]
    pub missing_soft_skills: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

/// A skill paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    pub score: f64, // 0.0 – 1.0
}

/// Skills extracted from a job description, highest score first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdAnalysisResult {
    #[serde(default)]
    pub tech_skills: Vec<SkillScore>,
    #[serde(default)]
    pub soft_skills: Vec<SkillScore>,
}

/// Derives the stored log score from a raw résumé payload.
///
/// `matchScore` is rounded to the nearest integer and clamped to 0–100.
/// Returns `None` when the field is missing or not a number.
pub fn log_score(payload: &Value) -> Option<i32> {
    let score = payload.get("matchScore")?.as_f64()?;
    if !score.is_finite() {
        return None;
    }
    Some(score.round().clamp(0.0, 100.0) as i32)
}
