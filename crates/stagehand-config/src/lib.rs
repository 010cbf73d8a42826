//! # Stagehand Config
//!
//! TOML configuration schema and loader. A malformed configuration file is
//! a fatal startup error; nothing here is recoverable at runtime.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    Config, DatabaseConfig, JobManagerConfig, LoggingConfig, OrchestratorConfig,
    ResourceManagerConfig, SchedulerCommands, ServerConfig,
};
