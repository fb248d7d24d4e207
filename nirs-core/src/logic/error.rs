//! Pipeline Errors
//!
//! Every boundary error carries a machine-readable kind (`PipelineError::kind`)
//! and a human-readable message. Collaborator internals never reach the message.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

// ============================================================================
// PIPELINE ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Columnar input is not a mapping of equal-length sequences
    #[error("shape error: {0}")]
    Shape(String),

    /// Input is well-shaped but violates a field rule (required, reserved, ids)
    #[error("validation error: {0}")]
    Validation(String),

    /// Signer failed - the whole batch is rejected
    #[error("signing error: {0}")]
    Signing(String),

    /// A collaborator exceeded its time bound
    #[error("{collaborator} did not respond within {timeout_ms} ms")]
    CollaboratorTimeout {
        collaborator: Collaborator,
        timeout_ms: u64,
    },

    /// A collaborator crashed while running
    #[error("{0} failed unexpectedly")]
    CollaboratorFailed(Collaborator),

    /// Journal or serialization failure in the dataset store
    #[error("storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Shape(_) => "shape_error",
            PipelineError::Validation(_) => "validation_error",
            PipelineError::Signing(_) => "signing_error",
            PipelineError::CollaboratorTimeout { .. } => "collaborator_timeout",
            PipelineError::CollaboratorFailed(_) => "collaborator_failed",
            PipelineError::Storage(_) => "storage_error",
        }
    }

    /// Rejected because of caller input (as opposed to an internal failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Shape(_) | PipelineError::Validation(_))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Storage(err.to_string())
    }
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// External collaborators the pipeline calls out to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Signer,
    Scorer,
    ForecastNoise,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::Signer => "signer",
            Collaborator::Scorer => "scorer",
            Collaborator::ForecastNoise => "forecast noise",
        }
    }
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by a collaborator implementation
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator rejected input: {0}")]
    Rejected(String),
}
