//! Read-side views.
//!
//! Reads reconcile against the backends first; when a backend cannot be
//! reached the last-known persisted value is returned with `stale` set,
//! never discarded.

use serde::Serialize;

use stagehand_protocols::entity::{Service, Session};
use stagehand_protocols::status::StepStatus;

/// A session as returned by read operations.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    /// True when at least one backing service could not be reconciled and
    /// the reported status is the last-known persisted one.
    pub stale: bool,
}

/// A service as returned by read operations.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: Service,
    pub stale: bool,
}

/// A step instance as returned by read operations.
///
/// `status` is the canonical combined status; `native_status` keeps the
/// raw scheduler tokens for operators who want them.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub id: i64,
    pub instance_name: String,
    pub status: StepStatus,
    pub native_status: String,
    pub progress: String,
    pub command: String,
    pub jobid: Option<i64>,
}
