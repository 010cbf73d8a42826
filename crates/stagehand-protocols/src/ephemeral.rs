//! Ephemeral-service driver trait.

use async_trait::async_trait;

use crate::entity::Service;
use crate::status::ServiceStatus;
use crate::workflow::{ReservationRequest, ServiceAttributes, ServiceSpec};

/// Which scheduler directive to build for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveAction {
    /// Allocate the service.
    Create,
    /// Release the service.
    Destroy,
    /// Attach a job to the running service.
    Use,
}

/// One ephemeral service kind: attribute validation, reservation-request
/// construction and scheduler-directive construction.
///
/// Implementations are selected through a registry built once at startup;
/// there is exactly one concrete type per [`ServiceKind`](crate::ServiceKind).
#[async_trait]
pub trait EphemeralServiceDriver: Send + Sync {
    /// The kind this driver implements.
    fn kind(&self) -> crate::workflow::ServiceKind;

    /// Validate kind-specific attributes.
    ///
    /// Returns `None` when the attributes are acceptable and a
    /// human-readable reason otherwise. Validation failure is a normal
    /// reportable result, never an error.
    fn check_attributes(&self, attributes: &ServiceAttributes) -> Option<String>;

    /// Build the reservation request the resource manager consumes.
    fn reservation_request(&self, spec: &ServiceSpec, user: &str) -> ReservationRequest;

    /// Build the scheduler-embeddable directive for `action`.
    ///
    /// Returns an empty string for kinds that need no directive.
    fn job_directives(&self, service: &Service, action: DirectiveAction) -> String;

    /// Query the authoritative backend for the service status.
    ///
    /// Returns `None` for kinds whose authoritative status is the
    /// last-persisted one (no external backend to ask).
    async fn query_status(&self, service_name: &str) -> Option<ServiceStatus>;
}
