//! Job submission errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    /// The submission command could not be spawned at all.
    #[error("Failed to spawn scheduler command: {0}")]
    Spawn(String),

    /// The submission command exceeded its time budget.
    #[error("Scheduler command timed out after {0}s")]
    Timeout(u64),

    /// The scheduler rejected the submission.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// The scheduler accepted the job but its answer carried no job id we
    /// could parse.
    #[error("Could not parse job id from scheduler output: {0:?}")]
    MissingJobId(String),

    /// A batch script could not be written before submission.
    #[error("Failed to write batch script: {0}")]
    Script(String),
}
