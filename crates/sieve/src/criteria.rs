//! Turns recruiter free text into structured [`MatchCriteria`] via the model.
//!
//! Shares the engine's retrier so criteria parsing competes for the same
//! outbound budget as resume analysis instead of dodging the rate limiter.

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::errors::AnalyzerError;
use crate::llm::{prompts, LlmClient};
use crate::models::{coerce_u32, EducationLevel, MatchCriteria};
use crate::retry::Retrier;

/// Wire shape the criteria-parsing prompt asks for.
#[derive(Debug, Default, Deserialize)]
struct ParsedCriteria {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default, deserialize_with = "de_experience")]
    min_experience: u32,
    #[serde(default)]
    education_level: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    other_requirements: Vec<String>,
}

fn de_experience<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(coerce_u32(serde_json::Value::deserialize(deserializer)?).unwrap_or(0))
}

impl From<ParsedCriteria> for MatchCriteria {
    fn from(parsed: ParsedCriteria) -> Self {
        MatchCriteria {
            skills: parsed
                .required_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            min_experience: parsed.min_experience,
            education_level: EducationLevel::parse(&parsed.education_level),
            location: parsed.location.trim().to_string(),
            custom: Default::default(),
            notes: parsed
                .other_requirements
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// LLM-backed parser for recruiter requirement text.
pub struct CriteriaParser {
    client: LlmClient,
    retrier: Retrier,
}

impl CriteriaParser {
    pub fn new(client: LlmClient, retrier: Retrier) -> Self {
        Self { client, retrier }
    }

    /// Parses free-form requirements like "senior Rust engineer, 5+ years,
    /// Berlin preferred" into structured criteria. Blank input short-circuits
    /// to empty criteria without a model call.
    pub async fn parse(&self, text: &str) -> Result<MatchCriteria, AnalyzerError> {
        if text.trim().is_empty() {
            return Ok(MatchCriteria::default());
        }

        let prompt = prompts::CRITERIA_PARSE_TEMPLATE.replace("{criteria_text}", text.trim());
        let parsed: ParsedCriteria = self
            .retrier
            .call(|| self.client.call_json(&prompt, prompts::CRITERIA_PARSE_SYSTEM))
            .await?;

        let criteria = MatchCriteria::from(parsed);
        info!(
            skills = criteria.skills.len(),
            min_experience = criteria.min_experience,
            education = %criteria.education_level,
            "parsed screening criteria"
        );
        Ok(criteria)
    }
}
