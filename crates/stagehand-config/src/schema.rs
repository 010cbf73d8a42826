//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scheduler: SchedulerCommands,

    #[serde(default)]
    pub jobmanager: JobManagerConfig,

    #[serde(default)]
    pub resourcemanager: ResourceManagerConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:` for an ephemeral store.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Env-filter directive, e.g. `info` or `stagehand=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path; stderr only when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Paths and behaviour of the scheduler commands the job manager drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerCommands {
    #[serde(default = "default_batch_cmd")]
    pub batch_cmd: String,

    #[serde(default = "default_cancel_cmd")]
    pub cancel_cmd: String,

    #[serde(default = "default_state_cmd")]
    pub state_cmd: String,

    #[serde(default = "default_control_cmd")]
    pub control_cmd: String,

    /// Whether the buffer plugin is lua-based, which changes both the
    /// directive prefix and the report format.
    #[serde(default)]
    pub lua_directives: bool,

    /// Per-call timeout for every scheduler command.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Directory batch scripts are written into before submission.
    #[serde(default = "default_script_dir")]
    pub script_dir: String,
}

impl Default for SchedulerCommands {
    fn default() -> Self {
        Self {
            batch_cmd: default_batch_cmd(),
            cancel_cmd: default_cancel_cmd(),
            state_cmd: default_state_cmd(),
            control_cmd: default_control_cmd(),
            lua_directives: false,
            command_timeout_secs: default_command_timeout(),
            script_dir: default_script_dir(),
        }
    }
}

fn default_batch_cmd() -> String {
    "/usr/bin/sbatch".to_string()
}

fn default_cancel_cmd() -> String {
    "/usr/bin/scancel".to_string()
}

fn default_state_cmd() -> String {
    "/usr/bin/squeue".to_string()
}

fn default_control_cmd() -> String {
    "/usr/bin/scontrol".to_string()
}

fn default_command_timeout() -> u64 {
    60
}

fn default_script_dir() -> String {
    "/tmp".to_string()
}

/// Job manager selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobManagerConfig {
    #[serde(default = "default_jobmanager")]
    pub name: String,
}

impl Default for JobManagerConfig {
    fn default() -> Self {
        Self {
            name: default_jobmanager(),
        }
    }
}

fn default_jobmanager() -> String {
    "slurm".to_string()
}

/// Resource manager selection and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceManagerConfig {
    /// `"remote"` for the HTTP resource manager, `"none"` otherwise.
    #[serde(default = "default_resourcemanager")]
    pub name: String,

    #[serde(default = "default_rm_host")]
    pub host: String,

    #[serde(default = "default_rm_port")]
    pub port: u16,

    #[serde(default = "default_rm_version")]
    pub version: String,

    #[serde(default = "default_rm_root_path")]
    pub root_path: String,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            name: default_resourcemanager(),
            host: default_rm_host(),
            port: default_rm_port(),
            version: default_rm_version(),
            root_path: default_rm_root_path(),
        }
    }
}

fn default_resourcemanager() -> String {
    "none".to_string()
}

fn default_rm_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rm_port() -> u16 {
    8080
}

fn default_rm_version() -> String {
    "v2.0.0".to_string()
}

fn default_rm_root_path() -> String {
    "/".to_string()
}

/// Orchestrator pacing for synchronous start/stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How many reconciliation rounds a synchronous call waits for before
    /// reporting a timeout.
    #[serde(default = "default_poll_attempts")]
    pub sync_poll_attempts: u32,

    /// Seconds between reconciliation rounds.
    #[serde(default = "default_poll_interval")]
    pub sync_poll_interval_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sync_poll_attempts: default_poll_attempts(),
            sync_poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_poll_attempts() -> u32 {
    60
}

fn default_poll_interval() -> u64 {
    5
}
