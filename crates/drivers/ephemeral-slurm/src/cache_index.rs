//! Cache-index ephemeral service driver.
//!
//! Provides an object-store-backed caching tier driven by a configuration
//! file that must already exist on the login node.

use std::fs::File;
use std::path::Path;
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

/// Driver for cache-index services.
pub struct CacheIndexDriver {
    lua_directives: bool,
    jobs: Arc<dyn JobManagerDriver>,
}

impl CacheIndexDriver {
    pub fn new(lua_directives: bool, jobs: Arc<dyn JobManagerDriver>) -> Self {
        Self {
            lua_directives,
            jobs,
        }
    }

    fn prefix(&self) -> String {
        directive::prefix(self.lua_directives, ServiceKind::CacheIndex)
    }
}

#[async_trait]
impl EphemeralServiceDriver for CacheIndexDriver {
    fn kind(&self) -> ServiceKind {
        ServiceKind::CacheIndex
    }

    fn check_attributes(&self, attributes: &ServiceAttributes) -> Option<String> {
        let Some(config) = attributes.dasiconfig.as_deref().filter(|c| !c.is_empty()) else {
            return Some(
                "a 'dasiconfig' attribute is mandatory for cache-index services".to_string(),
            );
        };
        // "Not absolute" and "unreadable" are distinct findings; operators
        // fix them differently.
        if !Path::new(config).is_absolute() {
            return Some(format!(
                "the configuration file '{config}' is not an absolute pathname"
            ));
        }
        if File::open(config).is_err() {
            return Some(format!(
                "could not open configuration file '{config}' for reading"
            ));
        }

        if attributes.namespace.as_deref().unwrap_or("").is_empty() {
            return Some(
                "a 'namespace' attribute is mandatory for cache-index services".to_string(),
            );
        }
        let Some(storagesize) = attributes.storagesize.as_deref() else {
            return Some(
                "a 'storagesize' attribute is mandatory for cache-index services".to_string(),
            );
        };
        if let Some(reason) = check_size(storagesize) {
            return Some(format!("storage size '{storagesize}' {reason}"));
        }

        if attributes.datanodes.unwrap_or(1) != 1 {
            return Some("number of datanodes can only be 1 for cache-index services".to_string());
        }
        None
    }

    fn reservation_request(&self, spec: &ServiceSpec, user: &str) -> ReservationRequest {
        let mut request = ReservationRequest::base(&spec.name, user, &spec.attributes);
        request.srv_type = self.kind().scheduler_tag().to_string();
        request.attributes.ssize = spec.attributes.storagesize.clone().unwrap_or_default();
        request
    }

    fn job_directives(&self, service: &Service, action: DirectiveAction) -> String {
        let prefix = self.prefix();
        match action {
            DirectiveAction::Create => format!(
                "{prefix} create_persistent Name={} StorageSize={} StorageDataServers={} \
                 data_dst={}",
                service.name, service.storagesize, service.datanodes, service.namespace
            ),
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
#[path = "cache_index_tests.rs"]
mod tests;
