//! # Stagehand Protocols
//!
//! Shared definitions for the Stagehand control plane: the persisted entity
//! model, the closed status vocabularies, and the three backend driver
//! traits. Contains only interface definitions and plain data - no
//! implementations.
//!
//! ## Core Traits
//!
//! - [`EphemeralServiceDriver`] - validation and request/directive building
//!   for one ephemeral service kind
//! - [`JobManagerDriver`] - job submission, cancellation and status
//!   translation for one scheduler
//! - [`ResourceManagerDriver`] - resource reservation and discovery

pub mod entity;
pub mod ephemeral;
pub mod error;
pub mod job;
pub mod resource;
pub mod status;
pub mod workflow;

pub use entity::{ActivityRecord, ObjectType, Service, Session, Step, StepDescription};
pub use ephemeral::{DirectiveAction, EphemeralServiceDriver};
pub use error::{JobError, OrchestratorError, StoreError};
pub use job::{JobManagerDriver, SubmitRequest};
pub use resource::ResourceManagerDriver;
pub use status::{Activity, ServiceStatus, SessionStatus, StepStatus};
pub use workflow::{
    Flavor, Location, ReservationAttributes, ReservationRequest, ServiceAttributes, ServiceKind,
    ServiceSpec, StepSpec, WorkflowDescription,
};
