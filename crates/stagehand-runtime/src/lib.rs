//! # Stagehand Runtime
//!
//! The session orchestrator: composes the persistent store and the three
//! backend drivers to drive session, service and step lifecycle, and keeps
//! persisted status reconciled with what the backends actually report.

mod orchestrator;
mod registry;
mod template;
mod views;

pub use orchestrator::{Orchestrator, StartSessionRequest};
pub use registry::DriverSet;
pub use template::{substitute, unresolved_variables, validate_session_name};
pub use views::{ServiceView, SessionView, StepView};
