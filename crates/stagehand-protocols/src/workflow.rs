//! Workflow-description input and reservation wire shapes.
//!
//! The workflow description arrives pre-parsed; its on-disk syntax is the
//! client's business. [`ReservationRequest`] is the JSON body the remote
//! resource manager consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of supported ephemeral service kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    BurstBuffer,
    NamespaceExport,
    CacheIndex,
    None,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::BurstBuffer => "burst-buffer",
            ServiceKind::NamespaceExport => "namespace-export",
            ServiceKind::CacheIndex => "cache-index",
            ServiceKind::None => "none",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "burst-buffer" => Some(ServiceKind::BurstBuffer),
            "namespace-export" => Some(ServiceKind::NamespaceExport),
            "cache-index" => Some(ServiceKind::CacheIndex),
            "none" => Some(ServiceKind::None),
            _ => None,
        }
    }

    /// The tag the scheduler's buffer plugin knows this kind by, used in
    /// job directives and reservation requests.
    pub fn scheduler_tag(&self) -> &'static str {
        match self {
            ServiceKind::BurstBuffer => "SBB",
            ServiceKind::NamespaceExport => "GBF",
            ServiceKind::CacheIndex => "DASI",
            ServiceKind::None => "NONE",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific service attributes as declared in a workflow description.
///
/// Which fields are mandatory depends on the kind; the ephemeral-service
/// driver's `check_attributes` is the authority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAttributes {
    #[serde(default)]
    pub targets: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub storagesize: Option<String>,
    #[serde(default)]
    pub dasiconfig: Option<String>,
    #[serde(default)]
    pub datanodes: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A service as declared in a workflow description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    #[serde(default)]
    pub attributes: ServiceAttributes,
}

/// A step template as declared in a workflow description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    pub command: String,
    /// Name of the declared service this step runs against, if any.
    #[serde(default)]
    pub service: Option<String>,
}

/// A pre-parsed workflow description: named services plus step templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Resource characteristics of a reservation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationAttributes {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub cores: u32,
    #[serde(default)]
    pub msize: String,
    #[serde(default)]
    pub ssize: String,
    #[serde(default)]
    pub gssize: String,
    #[serde(default)]
    pub mountpoint: String,
}

/// Body of `POST {base}/{version}/ephemeralservice/reserve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub name: String,
    pub user: String,
    pub user_token: String,
    pub srv_type: String,
    pub servers: u32,
    pub attributes: ReservationAttributes,
    pub location: Vec<String>,
}

impl ReservationRequest {
    /// The kind-independent part of a request; drivers fill in the rest.
    pub fn base(name: &str, user: &str, attrs: &ServiceAttributes) -> Self {
        Self {
            name: name.to_string(),
            user: user.to_string(),
            user_token: String::new(),
            srv_type: String::new(),
            servers: attrs.datanodes.unwrap_or(1),
            attributes: ReservationAttributes::default(),
            location: attrs
                .location
                .as_deref()
                .map(|l| l.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// A scheduler partition or resource-manager location usable for services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

/// A service flavor as advertised by the resource manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub name: String,
    #[serde(default)]
    pub cores: Option<u32>,
    #[serde(default)]
    pub msize: Option<String>,
    #[serde(default)]
    pub ssize: Option<String>,
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
