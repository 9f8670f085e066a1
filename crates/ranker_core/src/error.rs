use thiserror::Error;

use crate::StageKind;

/// Failure reported by the remote job service client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn validation(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Validation { status },
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Transport,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The service rejected the request (4xx).
    Validation { status: u16 },
    /// Network failure, timeout, 5xx or an undecodable body.
    Transport,
}

/// Everything the orchestrator can surface to the presentation layer.
///
/// Every variant renders as the single human-readable banner message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// Malformed or rejected upload, message verbatim from the service.
    #[error("{0}")]
    Validation(String),
    /// Command issued out of sequence.
    #[error("{0}")]
    Precondition(String),
    /// Network or server failure.
    #[error("{0}")]
    Transport(String),
    /// The service reported a terminal failure for a stage.
    #[error("{}", .stage.failure_message())]
    JobFailed { stage: StageKind },
}

impl OrchestratorError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

impl From<ServiceError> for OrchestratorError {
    fn from(err: ServiceError) -> Self {
        match err.kind {
            ServiceErrorKind::Validation { .. } => Self::Validation(err.message),
            ServiceErrorKind::Transport => Self::Transport(err.message),
        }
    }
}
