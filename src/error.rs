//! Error types for the lookup orchestrator

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Error, Debug)]
pub enum OrchestrationError {
    // =============================
    // Core Pipeline Errors
    // =============================

    /// The worker pool could not run or return a submitted task.
    /// This is the only error that escapes `Orchestrator::run`.
    #[error("Scheduling error: {0}")]
    SchedulingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Fault raised by an external collaborator (search, quote, extraction,
/// summarization). The orchestrator converts these into `TaskError` data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl CollaboratorError {
    /// Stable fault category recorded in `TaskError::kind`
    pub fn kind(&self) -> &'static str {
        match self {
            CollaboratorError::NotConfigured(_) => "NotConfigured",
            CollaboratorError::Timeout(_) => "Timeout",
            CollaboratorError::Request(_) => "Request",
            CollaboratorError::Status { .. } => "Status",
            CollaboratorError::Malformed(_) => "Malformed",
            CollaboratorError::Unavailable(_) => "Unavailable",
            CollaboratorError::Panicked(_) => "Panicked",
        }
    }
}

/// The request URL is dropped from the message; provider URLs may carry keys.
impl From<reqwest::Error> for CollaboratorError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            CollaboratorError::Timeout(e.to_string())
        } else if e.is_decode() {
            CollaboratorError::Malformed(e.to_string())
        } else {
            CollaboratorError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(CollaboratorError::Timeout("x".into()).kind(), "Timeout");
        assert_eq!(
            CollaboratorError::Status {
                status: 503,
                body: "busy".into()
            }
            .kind(),
            "Status"
        );
        assert_eq!(CollaboratorError::Panicked("boom".into()).kind(), "Panicked");
    }

    #[test]
    fn test_display_messages() {
        let err = CollaboratorError::NotConfigured("TAVILY_API_KEY".into());
        assert_eq!(err.to_string(), "TAVILY_API_KEY is not configured");

        let err = CollaboratorError::Status {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "provider returned 429: rate limited");

        let err = OrchestrationError::SchedulingError("pool closed".into());
        assert_eq!(err.to_string(), "Scheduling error: pool closed");
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OrchestrationError>();
        assert_send_sync::<CollaboratorError>();
    }
}
