//! Caller-facing orchestrator errors.
//!
//! Driver layers report sentinel values and typed errors; the orchestrator
//! maps everything onto these stable categories.

use thiserror::Error;

use super::store::StoreError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Unknown session, service or step.
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state, e.g. reusing the name of
    /// a non-terminal session.
    #[error("{0}")]
    Conflict(String),

    /// Invalid input: bad attributes, unresolved template variables,
    /// malformed names.
    #[error("{0}")]
    BadRequest(String),

    /// A backend (scheduler or resource manager) could not do its part.
    /// The persisted state is intact; retrying is legitimate.
    #[error("{0}")]
    Upstream(String),

    /// A synchronous operation gave up waiting for the backend to converge.
    /// Distinct from [`OrchestratorError::Upstream`]: the backend answered,
    /// it just had not converged within the bounded wait.
    #[error("{0}")]
    TimedOut(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_pass_through() {
        let err: OrchestratorError = StoreError::NotUnique("step".to_string()).into();
        assert!(matches!(err, OrchestratorError::Store(_)));
    }

    #[test]
    fn display_is_the_message() {
        let err = OrchestratorError::Conflict("session s1 is already started".to_string());
        assert_eq!(err.to_string(), "session s1 is already started");
    }
}
