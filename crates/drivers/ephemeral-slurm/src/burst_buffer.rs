//! Burst-buffer ephemeral service driver.

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

/// Driver for scheduler-managed burst buffers.
pub struct BurstBufferDriver {
    lua_directives: bool,
    jobs: Arc<dyn JobManagerDriver>,
}

impl BurstBufferDriver {
    pub fn new(lua_directives: bool, jobs: Arc<dyn JobManagerDriver>) -> Self {
        Self {
            lua_directives,
            jobs,
        }
    }

    fn prefix(&self) -> String {
        directive::prefix(self.lua_directives, ServiceKind::BurstBuffer)
    }
}

#[async_trait]
impl EphemeralServiceDriver for BurstBufferDriver {
    fn kind(&self) -> ServiceKind {
        ServiceKind::BurstBuffer
    }

    fn check_attributes(&self, attributes: &ServiceAttributes) -> Option<String> {
        if attributes.flavor.as_deref().unwrap_or("").is_empty() {
            return Some("a 'flavor' attribute is mandatory for burst-buffer services".to_string());
        }
        if attributes.targets.as_deref().unwrap_or("").is_empty() {
            return Some(
                "a nonempty 'targets' attribute is mandatory for burst-buffer services".to_string(),
            );
        }
        None
    }

    fn reservation_request(&self, spec: &ServiceSpec, user: &str) -> ReservationRequest {
        let mut request = ReservationRequest::base(&spec.name, user, &spec.attributes);
        request.srv_type = self.kind().scheduler_tag().to_string();
        request.attributes.flavor = spec.attributes.flavor.clone().unwrap_or_default();
        request.attributes.targets = spec
            .attributes
            .targets
            .as_deref()
            .map(|t| t.split(':').map(str::to_string).collect())
            .unwrap_or_default();
        request
    }

    fn job_directives(&self, service: &Service, action: DirectiveAction) -> String {
        let prefix = self.prefix();
        match action {
            DirectiveAction::Create => {
                let mut directive = format!(
                    "{prefix} create_persistent Name={} Flavor={} Targets={}",
                    service.name, service.flavor, service.targets
                );
                if service.datanodes > 1 {
                    directive.push_str(&format!(" Datanodes={}", service.datanodes));
                }
                directive
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
#[path = "burst_buffer_tests.rs"]
mod tests;
