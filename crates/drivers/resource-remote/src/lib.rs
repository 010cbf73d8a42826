//! # Stagehand Resource Manager Drivers
//!
//! [`ResourceManagerDriver`](stagehand_protocols::ResourceManagerDriver)
//! variants: the remote HTTP resource manager and the inert `none`
//! fallback used when no resource manager is deployed.

mod none;
mod remote;

pub use none::NoneResourceManager;
pub use remote::RemoteResourceManager;
