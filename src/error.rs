//! Crate-wide error taxonomy.
//!
//! Every stage boundary returns a `Result<_, PreprocessError>` rather than
//! propagating exceptions. Per-URL failures are recorded in the pipeline's
//! result bag and never abort a run; only configuration/validation errors
//! abort construction (see `PreprocessError::abort_on_construct`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity used for user-visible reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Broad error category, independent of the specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Network,
    Timeout,
    Authentication,
    Validation,
    NotSupported,
    RobotsBlocked,
    CircuitOpen,
    BulkheadRejected,
    ParseError,
    LlmError,
    Cancelled,
}

/// The crate's error taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PreprocessError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("blocked by robots.txt: {0}")]
    RobotsBlocked(String),

    #[error("circuit open for {policy_name}")]
    CircuitOpen { policy_name: String },

    #[error("bulkhead rejected for {policy_name}")]
    BulkheadRejected { policy_name: String },

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("llm error: {0}")]
    LlmError(String),

    #[error("cancelled")]
    Cancelled,
}

impl PreprocessError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::NotSupported(_) => ErrorCategory::NotSupported,
            Self::RobotsBlocked(_) => ErrorCategory::RobotsBlocked,
            Self::CircuitOpen { .. } => ErrorCategory::CircuitOpen,
            Self::BulkheadRejected { .. } => ErrorCategory::BulkheadRejected,
            Self::ParseError(_) => ErrorCategory::ParseError,
            Self::LlmError(_) => ErrorCategory::LlmError,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether a resilience `Retry` policy should re-attempt this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Authentication(_)
            | Self::Validation(_)
            | Self::NotSupported(_)
            | Self::RobotsBlocked(_)
            | Self::CircuitOpen { .. }
            | Self::BulkheadRejected { .. }
            | Self::ParseError(_)
            | Self::Cancelled => false,
            // LLM failures are retried by the resilience layer; the
            // Reconstructor/chunking strategies treat them as fallback
            // triggers regardless of this flag.
            Self::LlmError(_) => true,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::RobotsBlocked(_) | Self::Cancelled => Severity::Info,
            Self::CircuitOpen { .. } | Self::BulkheadRejected { .. } | Self::LlmError(_) => {
                Severity::Warning
            }
            Self::Authentication(_) | Self::Validation(_) => Severity::Critical,
            _ => Severity::Error,
        }
    }

    /// Build the full user-visible report envelope.
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        let suggested_actions = match self {
            Self::Network(_) | Self::Timeout(_) => {
                vec!["retry the request".to_string(), "check connectivity".to_string()]
            }
            Self::Authentication(_) => vec!["verify credentials".to_string()],
            Self::Validation(_) => vec!["fix the offending configuration field".to_string()],
            Self::NotSupported(_) => vec!["supply the missing capability".to_string()],
            Self::RobotsBlocked(_) => vec!["respect robots.txt; skip this URL".to_string()],
            Self::CircuitOpen { .. } => vec!["wait for the break duration to elapse".to_string()],
            Self::BulkheadRejected { .. } => vec!["reduce concurrent load".to_string()],
            Self::ParseError(_) => vec!["inspect the source document".to_string()],
            Self::LlmError(_) => vec!["pipeline fell back to pass-through".to_string()],
            Self::Cancelled => vec![],
        };

        ErrorReport {
            code: variant_code(self),
            message: self.to_string(),
            category: self.category(),
            severity: self.severity(),
            is_retryable: self.is_retryable(),
            related_resource: None,
            details: HashMap::new(),
            suggested_actions,
        }
    }
}

fn variant_code(err: &PreprocessError) -> &'static str {
    match err {
        PreprocessError::Network(_) => "NETWORK",
        PreprocessError::Timeout(_) => "TIMEOUT",
        PreprocessError::Authentication(_) => "AUTHENTICATION",
        PreprocessError::Validation(_) => "VALIDATION",
        PreprocessError::NotSupported(_) => "NOT_SUPPORTED",
        PreprocessError::RobotsBlocked(_) => "ROBOTS_BLOCKED",
        PreprocessError::CircuitOpen { .. } => "CIRCUIT_OPEN",
        PreprocessError::BulkheadRejected { .. } => "BULKHEAD_REJECTED",
        PreprocessError::ParseError(_) => "PARSE_ERROR",
        PreprocessError::LlmError(_) => "LLM_ERROR",
        PreprocessError::Cancelled => "CANCELLED",
    }
}

/// User-visible error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub is_retryable: bool,
    pub related_resource: Option<String>,
    pub details: HashMap<String, serde_json::Value>,
    pub suggested_actions: Vec<String>,
}

pub type Result<T> = std::result::Result<T, PreprocessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robots_blocked_is_not_an_error_severity() {
        let err = PreprocessError::RobotsBlocked("https://example.com".into());
        assert_eq!(err.severity(), Severity::Info);
        assert!(!err.is_retryable());
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(PreprocessError::Network("connection reset".into()).is_retryable());
        assert!(!PreprocessError::Validation("bad url".into()).is_retryable());
    }
}
