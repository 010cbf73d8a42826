//! The inert resource manager.
//!
//! Deployments without a remote resource manager still go through the
//! reservation path; this variant accepts everything and discovers
//! nothing.

use async_trait::async_trait;

use stagehand_protocols::resource::ResourceManagerDriver;
use stagehand_protocols::workflow::{Flavor, Location, ReservationRequest};

/// Driver used when no resource manager is configured.
#[derive(Default)]
pub struct NoneResourceManager;

impl NoneResourceManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourceManagerDriver for NoneResourceManager {
    fn id(&self) -> &str {
        "none"
    }

    async fn reserve(&self, request: &ReservationRequest) -> i32 {
        tracing::debug!(service = %request.name, "no reservation to do");
        0
    }

    async fn usable_locations(&self) -> Vec<Location> {
        Vec::new()
    }

    async fn usable_flavors(&self) -> Vec<Flavor> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_protocols::workflow::ServiceAttributes;

    #[tokio::test]
    async fn reservation_always_succeeds() {
        let manager = NoneResourceManager::new();
        let request = ReservationRequest::base("bb1", "alice", &ServiceAttributes::default());
        assert_eq!(manager.reserve(&request).await, 0);
    }

    #[tokio::test]
    async fn discovery_is_empty() {
        let manager = NoneResourceManager::new();
        assert!(manager.usable_locations().await.is_empty());
        assert!(manager.usable_flavors().await.is_empty());
    }
}
