//! # Stagehand Ephemeral Service Drivers
//!
//! One [`EphemeralServiceDriver`](stagehand_protocols::EphemeralServiceDriver)
//! implementation per service kind: burst-buffer, namespace-export,
//! cache-index and none. The scheduler-backed kinds build buffer-plugin
//! directives and read their status from the scheduler's buffer report;
//! the none kind is inert.

mod burst_buffer;
mod cache_index;
mod directive;
mod namespace_export;
mod none;
mod size;

#[cfg(test)]
mod testutil;

pub use burst_buffer::BurstBufferDriver;
pub use cache_index::CacheIndexDriver;
pub use namespace_export::NamespaceExportDriver;
pub use none::NoneDriver;
pub use size::check_size;
