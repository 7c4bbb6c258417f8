//! The engine façade: wires config, limiter, retrier, extractor, analyzer,
//! and queue together and exposes the screening workflow as one type.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::analyzer::{DocumentAnalyzer, LlmAnalyzer};
use crate::config::EngineConfig;
use crate::criteria::CriteriaParser;
use crate::errors::AnalyzerError;
use crate::extract::{LocalTextExtractor, TextExtractor};
use crate::filter::filter_candidates;
use crate::limiter::RateLimiter;
use crate::llm::LlmClient;
use crate::models::{AnalyzedDocument, MatchCriteria};
use crate::queue::{QueueOptions, ResubmitPolicy, TaskId, TaskQueue, TaskSnapshot, TaskStatus};
use crate::retry::Retrier;

/// One screening engine: a task queue over a shared rate-limited LLM client.
///
/// All analysis and criteria-parsing traffic flows through a single
/// [`RateLimiter`], so the adaptive delay reflects the engine's real call
/// rate no matter which path produced the request.
pub struct ResumeProcessor {
    queue: TaskQueue,
    criteria_parser: CriteriaParser,
}

impl ResumeProcessor {
    /// Production wiring: local PDF/TXT extraction and the LLM analyzer.
    /// The analyzer and the criteria parser share one client.
    pub fn new(config: EngineConfig) -> Result<Self, AnalyzerError> {
        let client = LlmClient::new(&config)?;
        let analyzer: Arc<dyn DocumentAnalyzer> = Arc::new(LlmAnalyzer::new(client.clone()));
        Ok(Self::assemble(
            &config,
            Arc::new(LocalTextExtractor),
            analyzer,
            client,
            ResubmitPolicy::default(),
        ))
    }

    /// Wiring with injected extraction and analysis backends. This is how
    /// tests run the full pipeline without a provider, and how embedders add
    /// DOCX or OCR support.
    pub fn with_backends(
        config: &EngineConfig,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        resubmit_policy: ResubmitPolicy,
    ) -> Result<Self, AnalyzerError> {
        let client = LlmClient::new(config)?;
        Ok(Self::assemble(config, extractor, analyzer, client, resubmit_policy))
    }

    fn assemble(
        config: &EngineConfig,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        client: LlmClient,
        resubmit_policy: ResubmitPolicy,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limiter.clone()));
        let retrier = Retrier::new(limiter, config.max_attempts);

        let queue = TaskQueue::start(
            extractor,
            analyzer,
            retrier.clone(),
            QueueOptions {
                resubmit_policy,
                max_document_chars: config.max_document_chars,
            },
        );
        info!(max_attempts = config.max_attempts, "resume processor started");

        Self {
            queue,
            criteria_parser: CriteriaParser::new(client, retrier),
        }
    }

    /// Enqueues a resume for analysis; returns immediately with the task id.
    pub fn submit(&self, path: &Path, criteria: Option<MatchCriteria>) -> TaskId {
        self.queue.submit(path, criteria)
    }

    pub fn result(&self, id: &TaskId) -> Option<TaskSnapshot> {
        self.queue.result(id)
    }

    pub fn statuses(&self) -> std::collections::HashMap<TaskId, TaskStatus> {
        self.queue.statuses()
    }

    pub fn completed(&self) -> Vec<AnalyzedDocument> {
        self.queue.completed()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    /// Polls until every submitted task reaches a terminal state.
    pub async fn wait_idle(&self) {
        while !self.queue.is_idle() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Parses recruiter free text into structured criteria via the model.
    pub async fn parse_criteria(&self, text: &str) -> Result<MatchCriteria, AnalyzerError> {
        self.criteria_parser.parse(text).await
    }

    /// Completed candidates that meet every structured criterion.
    pub fn filtered(&self, criteria: &MatchCriteria) -> Vec<AnalyzedDocument> {
        filter_candidates(&self.completed(), criteria)
    }

    /// Stops accepting work and drains what is already queued.
    pub async fn shutdown(self) {
        self.queue.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::analyzer::DocumentText;
    use crate::errors::ExtractError;
    use crate::models::CandidateProfile;

    struct CannedExtractor;

    impl TextExtractor for CannedExtractor {
        fn extract(&self, path: &Path) -> Result<String, ExtractError> {
            let stem = path.file_stem().unwrap().to_string_lossy();
            Ok(format!(
                "CANDIDATE {stem} has shipped production Rust services for many years running"
            ))
        }
    }

    struct CannedAnalyzer;

    #[async_trait]
    impl DocumentAnalyzer for CannedAnalyzer {
        async fn analyze(
            &self,
            doc: &DocumentText,
            criteria: Option<&MatchCriteria>,
        ) -> Result<CandidateProfile, AnalyzerError> {
            let name = doc.body.split_whitespace().nth(1).unwrap().to_string();
            Ok(CandidateProfile {
                name,
                skills: vec!["Rust".to_string()],
                experience_years: 6,
                match_score: criteria.map(|_| 80),
                ..Default::default()
            })
        }
    }

    fn processor() -> ResumeProcessor {
        let config = EngineConfig::new("https://example.test/v1/chat", "test-key");
        ResumeProcessor::with_backends(
            &config,
            Arc::new(CannedExtractor),
            Arc::new(CannedAnalyzer),
            ResubmitPolicy::Reprocess,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_submit_and_collect() {
        let processor = processor();

        let id = processor.submit(Path::new("Ada_Lovelace.pdf"), None);
        processor.wait_idle().await;

        let snapshot = processor.result(&id).unwrap();
        assert_eq!(snapshot.status, TaskStatus::Completed);
        let completed = processor.completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].profile.name, "Ada_Lovelace");
    }

    #[tokio::test(start_paused = true)]
    async fn test_filtered_applies_structured_criteria() {
        let processor = processor();
        processor.submit(Path::new("Ada_Lovelace.pdf"), None);
        processor.wait_idle().await;

        let rust = MatchCriteria {
            skills: vec!["Rust".to_string()],
            min_experience: 5,
            ..Default::default()
        };
        assert_eq!(processor.filtered(&rust).len(), 1);

        let go = MatchCriteria {
            skills: vec!["Go".to_string()],
            ..Default::default()
        };
        assert!(processor.filtered(&go).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_criteria_text_needs_no_model() {
        let processor = processor();
        let criteria = processor.parse_criteria("   ").await.unwrap();
        assert!(criteria.is_empty());
    }
}
