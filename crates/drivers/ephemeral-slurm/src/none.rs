//! The inert ephemeral service driver.
//!
//! Used for steps that run without any ephemeral storage: validation
//! always passes, no directives are emitted and no backend is queried.

use async_trait::async_trait;

use stagehand_protocols::entity::Service;
use stagehand_protocols::ephemeral::{DirectiveAction, EphemeralServiceDriver};
use stagehand_protocols::status::ServiceStatus;
use stagehand_protocols::workflow::{
    ReservationRequest, ServiceAttributes, ServiceKind, ServiceSpec,
};

/// Driver for the `none` service kind.
#[derive(Default)]
pub struct NoneDriver;

impl NoneDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EphemeralServiceDriver for NoneDriver {
    fn kind(&self) -> ServiceKind {
        ServiceKind::None
    }

    fn check_attributes(&self, _attributes: &ServiceAttributes) -> Option<String> {
        None
    }

    fn reservation_request(&self, spec: &ServiceSpec, user: &str) -> ReservationRequest {
        let mut request = ReservationRequest::base(&spec.name, user, &spec.attributes);
        request.srv_type = self.kind().scheduler_tag().to_string();
        request
    }

    fn job_directives(&self, _service: &Service, _action: DirectiveAction) -> String {
        String::new()
    }

    async fn query_status(&self, _service_name: &str) -> Option<ServiceStatus> {
        // The last-persisted status is authoritative; there is nothing to
        // ask.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::service_row;

    #[test]
    fn everything_is_valid() {
        assert_eq!(NoneDriver::new().check_attributes(&ServiceAttributes::default()), None);
    }

    #[test]
    fn no_directives_are_emitted() {
        let service = service_row("none1", ServiceKind::None);
        for action in [DirectiveAction::Create, DirectiveAction::Destroy, DirectiveAction::Use] {
            assert_eq!(NoneDriver::new().job_directives(&service, action), "");
        }
    }

    #[tokio::test]
    async fn no_backend_to_query() {
        assert_eq!(NoneDriver::new().query_status("none1").await, None);
    }

    #[test]
    fn reservation_request_is_bare() {
        let spec = ServiceSpec {
            name: "none1".to_string(),
            kind: ServiceKind::None,
            attributes: ServiceAttributes::default(),
        };
        let request = NoneDriver::new().reservation_request(&spec, "alice");
        assert_eq!(request.srv_type, "NONE");
        assert!(request.attributes.flavor.is_empty());
    }
}
