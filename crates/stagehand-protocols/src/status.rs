//! Closed status vocabularies for sessions, services and steps.
//!
//! Every status that crosses a component boundary is one of these enums.
//! Scheduler-native vocabularies stay inside the job-manager driver; only
//! the translation into these types is shared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of a session.
///
/// `Stopped` and `Teardown` are terminal: a session name only has to be
/// unique among sessions that are not in one of these two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Starting,
    Active,
    Stopping,
    Stopped,
    Teardown,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Starting => "STARTING",
            SessionStatus::Active => "ACTIVE",
            SessionStatus::Stopping => "STOPPING",
            SessionStatus::Stopped => "STOPPED",
            SessionStatus::Teardown => "TEARDOWN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STARTING" => Some(SessionStatus::Starting),
            "ACTIVE" => Some(SessionStatus::Active),
            "STOPPING" => Some(SessionStatus::Stopping),
            "STOPPED" => Some(SessionStatus::Stopped),
            "TEARDOWN" => Some(SessionStatus::Teardown),
            _ => None,
        }
    }

    /// Terminal sessions no longer hold resources and do not block reuse of
    /// their name.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Stopped | SessionStatus::Teardown)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle states of an ephemeral service.
///
/// The staging states mirror what the scheduler reports for a buffer that
/// is moving data in or out; `Unknown` means the backend could not be
/// queried and is never written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Waiting,
    #[serde(rename = "STAGINGIN")]
    StagingIn,
    #[serde(rename = "STAGEDIN")]
    StagedIn,
    Allocated,
    #[serde(rename = "STAGINGOUT")]
    StagingOut,
    #[serde(rename = "STAGEDOUT")]
    StagedOut,
    Stopping,
    Stopped,
    Teardown,
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Waiting => "WAITING",
            ServiceStatus::StagingIn => "STAGINGIN",
            ServiceStatus::StagedIn => "STAGEDIN",
            ServiceStatus::Allocated => "ALLOCATED",
            ServiceStatus::StagingOut => "STAGINGOUT",
            ServiceStatus::StagedOut => "STAGEDOUT",
            ServiceStatus::Stopping => "STOPPING",
            ServiceStatus::Stopped => "STOPPED",
            ServiceStatus::Teardown => "TEARDOWN",
            ServiceStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "WAITING" => Some(ServiceStatus::Waiting),
            "STAGINGIN" => Some(ServiceStatus::StagingIn),
            "STAGEDIN" => Some(ServiceStatus::StagedIn),
            "ALLOCATED" => Some(ServiceStatus::Allocated),
            "STAGINGOUT" => Some(ServiceStatus::StagingOut),
            "STAGEDOUT" => Some(ServiceStatus::StagedOut),
            "STOPPING" => Some(ServiceStatus::Stopping),
            "STOPPED" => Some(ServiceStatus::Stopped),
            "TEARDOWN" => Some(ServiceStatus::Teardown),
            "UNKNOWN" => Some(ServiceStatus::Unknown),
            _ => None,
        }
    }

    /// A usable service: steps may run against it.
    pub fn is_allocated(&self) -> bool {
        matches!(self, ServiceStatus::Allocated | ServiceStatus::StagedIn)
    }

    /// A released service: its resources are gone.
    pub fn is_stopped(&self) -> bool {
        matches!(self, ServiceStatus::Stopped | ServiceStatus::StagedOut)
    }

    /// A service in one of these states still holds resources that a stop
    /// request must release.
    pub fn is_stoppable(&self) -> bool {
        matches!(
            self,
            ServiceStatus::Allocated | ServiceStatus::StagedIn | ServiceStatus::Waiting
        )
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical step status, decoupled from any scheduler's native vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
    Suspended,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Starting => "STARTING",
            StepStatus::Running => "RUNNING",
            StepStatus::Stopping => "STOPPING",
            StepStatus::Stopped => "STOPPED",
            StepStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STARTING" => Some(StepStatus::Starting),
            "RUNNING" => Some(StepStatus::Running),
            "STOPPING" => Some(StepStatus::Stopping),
            "STOPPED" => Some(StepStatus::Stopped),
            "SUSPENDED" => Some(StepStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to an object, as recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Creation,
    Removal,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Creation => "creation",
            Activity::Removal => "removal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "creation" => Some(Activity::Creation),
            "removal" => Some(Activity::Removal),
            _ => None,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
