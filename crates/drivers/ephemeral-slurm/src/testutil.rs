//! Test doubles shared by the driver tests.

use std::sync::Arc;

use async_trait::async_trait;

use stagehand_protocols::error::JobError;
use stagehand_protocols::job::{JobManagerDriver, SubmitRequest};
use stagehand_protocols::status::{ServiceStatus, StepStatus};
use stagehand_protocols::workflow::Location;

/// A job manager that answers every buffer query with one fixed status.
pub struct FixedStatusJobManager {
    pub buffer: ServiceStatus,
}

impl FixedStatusJobManager {
    pub fn allocated() -> Arc<dyn JobManagerDriver> {
        Arc::new(Self {
            buffer: ServiceStatus::Allocated,
        })
    }
}

#[async_trait]
impl JobManagerDriver for FixedStatusJobManager {
    fn id(&self) -> &str {
        "fixed"
    }

    fn to_canonical_status(&self, _native: &str) -> StepStatus {
        StepStatus::Stopped
    }

    fn combine_status_for_output(&self, tokens: &str) -> String {
        tokens.to_string()
    }

    fn combine_status_for_stopping(&self, tokens: &str) -> String {
        tokens.to_string()
    }

    async fn get_job_status(&self, _jobid: i64) -> String {
        "STOPPED".to_string()
    }

    async fn cancel_job(&self, _jobid: i64) -> i32 {
        0
    }

    async fn get_usable_locations(&self) -> Vec<Location> {
        Vec::new()
    }

    async fn buffer_status(&self, _name: &str) -> ServiceStatus {
        self.buffer
    }

    async fn submit(&self, _request: SubmitRequest) -> Result<i64, JobError> {
        Ok(1)
    }
}

/// A service entity with the given name and kind-relevant fields filled in.
pub fn service_row(
    name: &str,
    kind: stagehand_protocols::workflow::ServiceKind,
) -> stagehand_protocols::entity::Service {
    stagehand_protocols::entity::Service {
        id: 1,
        session_id: 1,
        name: name.to_string(),
        kind,
        location: String::new(),
        targets: "/a:/b".to_string(),
        flavor: "small".to_string(),
        namespace: "/ns/data".to_string(),
        mountpoint: "/mnt/data".to_string(),
        storagesize: "20Gi".to_string(),
        datanodes: 1,
        start_time: chrono::Utc::now(),
        end_time: None,
        status: ServiceStatus::Waiting,
        jobid: None,
    }
}
