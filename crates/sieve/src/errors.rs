//! Error taxonomy for the screening engine.
//!
//! The retry layer keys its backoff choice off these variants, so
//! classification is structural (status codes, parse results), never
//! substring matching on error messages.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the analysis pipeline (LLM client, analyzer, retrier).
///
/// Three operational classes:
/// - retryable with exponential+jitter backoff: `RateLimited`
/// - retryable with capped linear backoff: `Transient`, `Http`
/// - unrecoverable, fails the task immediately: `Malformed`, `EmptyContent`,
///   `UnusableText`
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("rate limited by provider (status {status})")]
    RateLimited {
        status: u16,
        /// Parsed from the `Retry-After` header when the provider sends one.
        retry_after: Option<Duration>,
    },

    #[error("API error (status {status}): {message}")]
    Transient { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("model returned empty content")]
    EmptyContent,

    #[error("document text unusable: {0}")]
    UnusableText(String),

    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<AnalyzerError>,
    },
}

impl AnalyzerError {
    /// Rate-limit signal: cured by spacing, so it gets the adaptive
    /// exponential backoff path.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AnalyzerError::RateLimited { .. })
    }

    /// Errors that waiting cannot fix. The retrier surfaces these without
    /// consuming further attempts.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            AnalyzerError::Malformed(_)
                | AnalyzerError::EmptyContent
                | AnalyzerError::UnusableText(_)
        )
    }

    /// Terminal wrapper around the last attempt's error.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, AnalyzerError::RetriesExhausted { .. })
    }
}

/// Errors from the document-to-text collaborator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_classified_rate_limit() {
        let err = AnalyzerError::RateLimited {
            status: 429,
            retry_after: None,
        };
        assert!(err.is_rate_limit());
        assert!(!err.is_unrecoverable());
    }

    #[test]
    fn test_transient_is_neither_rate_limit_nor_unrecoverable() {
        let err = AnalyzerError::Transient {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(!err.is_rate_limit());
        assert!(!err.is_unrecoverable());
    }

    #[test]
    fn test_malformed_and_empty_are_unrecoverable() {
        assert!(AnalyzerError::Malformed("bad json".to_string()).is_unrecoverable());
        assert!(AnalyzerError::EmptyContent.is_unrecoverable());
        assert!(AnalyzerError::UnusableText("too short".to_string()).is_unrecoverable());
    }

    #[test]
    fn test_retries_exhausted_preserves_source_message() {
        let err = AnalyzerError::RetriesExhausted {
            attempts: 5,
            source: Box::new(AnalyzerError::Transient {
                status: 500,
                message: "boom".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("boom"));
    }
}
