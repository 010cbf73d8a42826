//! Namespace-export ephemeral service driver.
//!
//! Exports a namespace as a transient mounted filesystem through the
//! scheduler's buffer plugin.

use std::sync::Arc;

use async_trait::async_trait;

use stagehand_protocols::entity::Service;
use stagehand_protocols::ephemeral::{DirectiveAction, EphemeralServiceDriver};
use stagehand_protocols::job::JobManagerDriver;
use stagehand_protocols::status::ServiceStatus;
use stagehand_protocols::workflow::{
    ReservationRequest, ServiceAttributes, ServiceKind, ServiceSpec,
};

use crate::directive;
use crate::size::check_size;

/// Driver for namespace exports.
pub struct NamespaceExportDriver {
    lua_directives: bool,
    jobs: Arc<dyn JobManagerDriver>,
}

impl NamespaceExportDriver {
    pub fn new(lua_directives: bool, jobs: Arc<dyn JobManagerDriver>) -> Self {
        Self {
            lua_directives,
            jobs,
        }
    }

    fn prefix(&self) -> String {
        directive::prefix(self.lua_directives, ServiceKind::NamespaceExport)
    }
}

#[async_trait]
impl EphemeralServiceDriver for NamespaceExportDriver {
    fn kind(&self) -> ServiceKind {
        ServiceKind::NamespaceExport
    }

    fn check_attributes(&self, attributes: &ServiceAttributes) -> Option<String> {
        if attributes.namespace.as_deref().unwrap_or("").is_empty() {
            return Some(
                "a 'namespace' attribute is mandatory for namespace-export services".to_string(),
            );
        }
        if attributes.mountpoint.as_deref().unwrap_or("").is_empty() {
            return Some(
                "a 'mountpoint' attribute is mandatory for namespace-export services".to_string(),
            );
        }
        let Some(storagesize) = attributes.storagesize.as_deref() else {
            return Some(
                "a 'storagesize' attribute is mandatory for namespace-export services".to_string(),
            );
        };
        check_size(storagesize).map(|reason| format!("storage size '{storagesize}' {reason}"))
    }

    fn reservation_request(&self, spec: &ServiceSpec, user: &str) -> ReservationRequest {
        let mut request = ReservationRequest::base(&spec.name, user, &spec.attributes);
        request.srv_type = self.kind().scheduler_tag().to_string();
        request.attributes.ssize = spec.attributes.storagesize.clone().unwrap_or_default();
        request.attributes.mountpoint = spec.attributes.mountpoint.clone().unwrap_or_default();
        request
    }

    fn job_directives(&self, service: &Service, action: DirectiveAction) -> String {
        let prefix = self.prefix();
        match action {
            DirectiveAction::Create => {
                // The export runs one storage data server and no separate
                // metadata server.
                format!(
                    "{prefix} create_persistent Name={} StorageSize={} Path={} FSType=ganesha \
                     MetaDataServers=0 StorageDataServers={} data_dst={}",
                    service.name,
                    service.storagesize,
                    service.mountpoint,
                    service.datanodes,
                    service.namespace
                )
            }
            DirectiveAction::Destroy => {
                format!("{prefix} destroy_persistent Name={}", service.name)
            }
            DirectiveAction::Use => format!("{prefix} use_persistent Name={}", service.name),
        }
    }

    async fn query_status(&self, service_name: &str) -> Option<ServiceStatus> {
        Some(self.jobs.buffer_status(service_name).await)
    }
}

#[cfg(test)]
#[path = "namespace_export_tests.rs"]
mod tests;
