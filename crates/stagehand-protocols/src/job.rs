//! Job-manager driver trait.

use async_trait::async_trait;

use crate::error::JobError;
use crate::status::{ServiceStatus, StepStatus};
use crate::workflow::Location;

/// A batch submission handed to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    /// Short job name shown by the scheduler.
    pub job_name: String,
    /// Buffer directive embedded in the batch script, if any.
    pub directives: Option<String>,
    /// Command the job runs.
    pub command: String,
    /// Partition to submit into, if constrained.
    pub partition: Option<String>,
    /// Job that must finish before this one starts.
    pub dependency: Option<i64>,
}

/// One job scheduler: submission, cancellation, status queries and the
/// translation between its native status vocabulary and the canonical one.
#[async_trait]
pub trait JobManagerDriver: Send + Sync {
    /// Scheduler identifier, e.g. `"slurm"`.
    fn id(&self) -> &str;

    /// Translate one native status token into the canonical vocabulary.
    ///
    /// Total over all inputs: an unrecognized token fails closed to
    /// [`StepStatus::Stopped`].
    fn to_canonical_status(&self, native: &str) -> StepStatus;

    /// Reduce blank-separated native tokens to the single token most
    /// relevant for display, favouring the most in-progress one.
    fn combine_status_for_output(&self, tokens: &str) -> String;

    /// Reduce blank-separated native tokens to the single token that
    /// decides whether cancellation is still meaningful.
    fn combine_status_for_stopping(&self, tokens: &str) -> String;

    /// Query the native status of a job.
    ///
    /// Heterogeneous jobs yield several blank-separated tokens. A job the
    /// scheduler no longer knows reports the native stopped token.
    async fn get_job_status(&self, jobid: i64) -> String;

    /// Cancel a job; returns the cancel command's exit code.
    async fn cancel_job(&self, jobid: i64) -> i32;

    /// Partitions usable for service placement. Empty on failure, which is
    /// reported once per call; retrying is the caller's decision.
    async fn get_usable_locations(&self) -> Vec<Location>;

    /// Status of a named buffer according to the scheduler's buffer report.
    ///
    /// A buffer missing from the report is [`ServiceStatus::Stopped`]
    /// (assumed torn down); a failing report command is
    /// [`ServiceStatus::Unknown`].
    async fn buffer_status(&self, name: &str) -> ServiceStatus;

    /// Submit a batch job; returns the scheduler job id.
    async fn submit(&self, request: SubmitRequest) -> Result<i64, JobError>;
}
