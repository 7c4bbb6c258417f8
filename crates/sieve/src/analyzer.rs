//! Document analyzer: turns resume text into a [`CandidateProfile`].
//!
//! The queue only sees the [`DocumentAnalyzer`] trait; `LlmAnalyzer` is the
//! production backend. Tests swap in deterministic fakes the same way the
//! processor swaps extraction backends.

use async_trait::async_trait;

use crate::errors::AnalyzerError;
use crate::llm::{prompts, LlmClient};
use crate::models::{CandidateProfile, MatchCriteria};

/// Preprocessed resume text plus the optional candidate-name hint recovered
/// from the filename.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub body: String,
    pub name_hint: Option<String>,
}

impl DocumentText {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name_hint: None,
        }
    }

    pub fn with_hint(body: impl Into<String>, name_hint: Option<String>) -> Self {
        Self {
            body: body.into(),
            name_hint,
        }
    }
}

/// The analysis collaborator invoked once per task by the queue worker
/// (through the retrier). When criteria are provided the returned profile
/// also carries a match score and gap analysis.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        doc: &DocumentText,
        criteria: Option<&MatchCriteria>,
    ) -> Result<CandidateProfile, AnalyzerError>;
}

/// LLM-backed analyzer.
pub struct LlmAnalyzer {
    client: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }
}

#[async_trait]
impl DocumentAnalyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        doc: &DocumentText,
        criteria: Option<&MatchCriteria>,
    ) -> Result<CandidateProfile, AnalyzerError> {
        let prompt = build_extraction_prompt(doc, criteria);
        self.client
            .call_json::<CandidateProfile>(&prompt, prompts::EXTRACTION_SYSTEM)
            .await
    }
}

fn build_extraction_prompt(doc: &DocumentText, criteria: Option<&MatchCriteria>) -> String {
    let hint = doc
        .name_hint
        .as_deref()
        .map(|name| format!("\nHINT: The candidate's name might be '{name}' based on the filename."))
        .unwrap_or_default();

    match criteria.filter(|c| !c.is_empty()) {
        Some(c) => prompts::EXTRACTION_WITH_CRITERIA_TEMPLATE
            .replace("{criteria}", &c.describe())
            .replace("{name_hint}", &hint)
            .replace("{resume_text}", &doc.body),
        None => prompts::EXTRACTION_PROMPT_TEMPLATE
            .replace("{name_hint}", &hint)
            .replace("{resume_text}", &doc.body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EducationLevel;

    #[test]
    fn test_prompt_without_criteria_omits_evaluation_section() {
        let doc = DocumentText::new("## EXPERIENCE built things");
        let prompt = build_extraction_prompt(&doc, None);
        assert!(prompt.contains("## EXPERIENCE built things"));
        assert!(!prompt.contains("match_score"));
        assert!(!prompt.contains("HINT:"));
    }

    #[test]
    fn test_prompt_with_criteria_embeds_requirements_and_score_schema() {
        let doc = DocumentText::new("resume body");
        let criteria = MatchCriteria {
            skills: vec!["Rust".to_string()],
            min_experience: 5,
            education_level: EducationLevel::Masters,
            ..Default::default()
        };
        let prompt = build_extraction_prompt(&doc, Some(&criteria));
        assert!(prompt.contains("Skills: Rust"));
        assert!(prompt.contains("Experience: 5+ years"));
        assert!(prompt.contains("match_score"));
        assert!(prompt.contains("gap_analysis"));
    }

    #[test]
    fn test_empty_criteria_falls_back_to_plain_extraction() {
        let doc = DocumentText::new("resume body");
        let prompt = build_extraction_prompt(&doc, Some(&MatchCriteria::default()));
        assert!(!prompt.contains("match_score"));
    }

    #[test]
    fn test_name_hint_is_injected() {
        let doc = DocumentText::with_hint("resume body", Some("Jane Doe".to_string()));
        let prompt = build_extraction_prompt(&doc, None);
        assert!(prompt.contains("HINT: The candidate's name might be 'Jane Doe'"));
    }
}
