/// Engine Errors
///
/// Only a sanitizer veto fails a whole run; executor and remote errors are
/// turned into per-test verdicts by the grader.
use std::time::Duration;
use thiserror::Error;
use verity_common::types::StatusId;

/// Sanitizer veto; fatal to the whole run
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Submission rejected: disallowed construct '{rule}' ({snippet})")]
pub struct UnsafeSubmission {
    pub rule: String,
    pub snippet: String,
}

/// Batch-level grading failure. Only a sanitizer veto aborts a run; every
/// other failure is folded into a per-test result.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error(transparent)]
    Unsafe(#[from] UnsafeSubmission),
}

/// Failure of a single local test execution
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Execution timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    RuntimeFault(String),

    #[error("{0}")]
    CompileFault(String),

    #[error("Failed to start interpreter: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Malformed harness output: {0}")]
    Protocol(String),
}

impl ExecutionError {
    pub fn status(&self) -> StatusId {
        match self {
            ExecutionError::Timeout(_) => StatusId::TimeLimitExceeded,
            ExecutionError::RuntimeFault(_) => StatusId::RuntimeError,
            ExecutionError::CompileFault(_) => StatusId::CompilationError,
            ExecutionError::Spawn(_) | ExecutionError::Protocol(_) => StatusId::InternalError,
        }
    }
}

/// Transport failure talking to the remote execution service
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Execution service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Execution service timed out")]
    ServiceTimeout,
}

impl RemoteError {
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::ServiceTimeout
        } else if error.is_connect() {
            RemoteError::ServiceUnavailable("connection failed".to_string())
        } else {
            RemoteError::ServiceUnavailable(error.to_string())
        }
    }
}

/// Failure reported by the submission-recording collaborator
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Submission recorder is not configured")]
    NotConfigured,

    #[error("Submission recorder request failed: {0}")]
    Network(String),

    #[error("Submission recorder returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Submission recorder returned an unreadable response: {0}")]
    Decode(String),

    #[error("Refusing to record a submission that did not pass every test")]
    NotAllPassed,
}
