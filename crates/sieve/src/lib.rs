//! Sieve, an asynchronous resume-screening engine.
//!
//! Documents go in, structured candidate profiles come out. Submissions are
//! queued and drained by a single worker so that one adaptive rate limiter
//! governs every model call; recruiters poll for status and results without
//! ever blocking on the provider.
//!
//! ```no_run
//! use std::path::Path;
//! use sieve::{EngineConfig, ResumeProcessor};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let processor = ResumeProcessor::new(EngineConfig::from_env()?)?;
//! let criteria = processor.parse_criteria("Rust, 5+ years, Berlin").await?;
//!
//! processor.submit(Path::new("resumes/Jane_Doe.pdf"), Some(criteria.clone()));
//! processor.wait_idle().await;
//!
//! for candidate in processor.filtered(&criteria) {
//!     println!("{}: {:?}", candidate.profile.name, candidate.profile.match_score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod criteria;
pub mod errors;
pub mod export;
pub mod extract;
pub mod filter;
pub mod limiter;
pub mod llm;
pub mod models;
pub mod preprocess;
pub mod processor;
pub mod queue;
pub mod retry;

pub use analyzer::{DocumentAnalyzer, DocumentText, LlmAnalyzer};
pub use config::EngineConfig;
pub use criteria::CriteriaParser;
pub use errors::{AnalyzerError, ExtractError};
pub use export::{save_csv, to_csv};
pub use extract::{LocalTextExtractor, TextExtractor};
pub use filter::{filter_candidates, matches_criteria};
pub use limiter::{RateLimiter, RateLimiterConfig};
pub use models::{
    AnalyzedDocument, CandidateProfile, DocumentRef, EducationEntry, EducationLevel,
    LanguageSkill, MatchCriteria, WorkEntry,
};
pub use preprocess::{name_hint_from_path, preprocess_resume_text};
pub use processor::ResumeProcessor;
pub use queue::{QueueOptions, ResubmitPolicy, TaskId, TaskQueue, TaskSnapshot, TaskStatus};
pub use retry::Retrier;
