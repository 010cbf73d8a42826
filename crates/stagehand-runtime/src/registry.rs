//! Driver registry.
//!
//! One [`DriverSet`] is built at startup from configuration and passed to
//! the orchestrator; nothing is dispatched through globals.

use std::collections::HashMap;
use std::sync::Arc;

use stagehand_protocols::ephemeral::EphemeralServiceDriver;
use stagehand_protocols::job::JobManagerDriver;
use stagehand_protocols::resource::ResourceManagerDriver;
use stagehand_protocols::workflow::ServiceKind;

/// The three backend drivers the orchestrator composes.
pub struct DriverSet {
    ephemeral: HashMap<ServiceKind, Arc<dyn EphemeralServiceDriver>>,
    jobs: Arc<dyn JobManagerDriver>,
    resources: Arc<dyn ResourceManagerDriver>,
}

impl DriverSet {
    pub fn new(jobs: Arc<dyn JobManagerDriver>, resources: Arc<dyn ResourceManagerDriver>) -> Self {
        Self {
            ephemeral: HashMap::new(),
            jobs,
            resources,
        }
    }

    /// Register the driver for its service kind. The last registration for
    /// a kind wins.
    pub fn with_ephemeral(mut self, driver: Arc<dyn EphemeralServiceDriver>) -> Self {
        self.ephemeral.insert(driver.kind(), driver);
        self
    }

    pub fn ephemeral(&self, kind: ServiceKind) -> Option<&Arc<dyn EphemeralServiceDriver>> {
        self.ephemeral.get(&kind)
    }

    pub fn jobs(&self) -> &Arc<dyn JobManagerDriver> {
        &self.jobs
    }

    pub fn resources(&self) -> &Arc<dyn ResourceManagerDriver> {
        &self.resources
    }

    /// Whether a real resource manager is deployed; location discovery
    /// falls back to the job manager when there is none.
    pub fn has_resource_manager(&self) -> bool {
        self.resources.id() != "none"
    }
}
