//! Persisted entities.
//!
//! These are the flat records the store reads and writes. Relations are by
//! id only: every `Service` and `StepDescription` belongs to exactly one
//! `Session`, every `Step` to exactly one `StepDescription`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{Activity, ServiceStatus, SessionStatus, StepStatus};
use crate::workflow::ServiceKind;

/// Top-level workflow execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub workflow_name: String,
    pub user_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

/// An ephemeral storage service owned by a session.
///
/// Rows are created at reservation time and retained through teardown; a
/// stop only moves `status` to a terminal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub session_id: i64,
    pub name: String,
    pub kind: ServiceKind,
    pub location: String,
    pub targets: String,
    pub flavor: String,
    pub namespace: String,
    pub mountpoint: String,
    pub storagesize: String,
    pub datanodes: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: ServiceStatus,
    /// Scheduler job that creates the service. Absent until the creation
    /// job has been submitted.
    pub jobid: Option<i64>,
}

/// A reusable command template bound to a session and (optionally) to one
/// of its services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescription {
    pub id: i64,
    pub session_id: i64,
    pub name: String,
    pub command: String,
    /// `None` when the step runs without any ephemeral service.
    pub service_id: Option<i64>,
}

/// One timed execution instance of a step description.
///
/// `status` holds the scheduler-native token string as last observed -
/// possibly several blank-separated tokens for a heterogeneous job. The
/// canonical [`StepStatus`] is derived on read. `jobid` is immutable once
/// assigned; re-execution creates a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub step_description_id: i64,
    pub instance_name: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub status: String,
    pub progress: String,
    pub command: String,
    pub jobid: Option<i64>,
}

impl Step {
    /// The canonical view of the stored native status, before any
    /// multi-token combination.
    pub fn canonical_status(&self) -> Option<StepStatus> {
        StepStatus::parse(&self.status)
    }
}

/// Entity kinds tracked by the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Session,
    Service,
    StepDescription,
    Step,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Session => "session",
            ObjectType::Service => "service",
            ObjectType::StepDescription => "step_description",
            ObjectType::Step => "step",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "session" => Some(ObjectType::Session),
            "service" => Some(ObjectType::Service),
            "step_description" => Some(ObjectType::StepDescription),
            "step" => Some(ObjectType::Step),
            _ => None,
        }
    }
}

/// Append-only audit record. Never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub object_type: ObjectType,
    pub object_id: i64,
    pub activity: Activity,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
