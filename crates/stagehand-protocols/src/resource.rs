//! Resource-manager driver trait.

use async_trait::async_trait;

use crate::workflow::{Flavor, Location, ReservationRequest};

/// A resource manager: reservation plus location/flavor discovery.
///
/// Failures never cross this boundary as errors: `reserve` reports a
/// sentinel result code and the discovery calls degrade to empty lists.
#[async_trait]
pub trait ResourceManagerDriver: Send + Sync {
    /// Resource-manager identifier, e.g. `"remote"` or `"none"`.
    fn id(&self) -> &str;

    /// Reserve the resources described by `request`.
    ///
    /// Returns 0 on success and -1 on any failure (transport error,
    /// connect failure, non-200 response). No internal retry.
    async fn reserve(&self, request: &ReservationRequest) -> i32;

    /// Locations usable for reservations; empty on failure.
    async fn usable_locations(&self) -> Vec<Location>;

    /// Flavors usable for reservations; empty on failure.
    async fn usable_flavors(&self) -> Vec<Flavor>;
}
