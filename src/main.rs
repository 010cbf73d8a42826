//! Stagehand - ephemeral-storage workflow orchestration control plane
//!
//! Main entry point: loads configuration, opens the store, builds the
//! driver registry and serves the HTTP API. Startup failures (unreadable
//! configuration, unwritable store) terminate the process; nothing else
//! does.

mod api;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stagehand_config::{Config, ConfigLoader};
use stagehand_ephemeral_slurm::{
    BurstBufferDriver, CacheIndexDriver, NamespaceExportDriver, NoneDriver,
};
use stagehand_job_slurm::SlurmJobManager;
use stagehand_protocols::job::JobManagerDriver;
use stagehand_protocols::resource::ResourceManagerDriver;
use stagehand_resource_remote::{NoneResourceManager, RemoteResourceManager};
use stagehand_runtime::{DriverSet, Orchestrator};
use stagehand_store::Store;

/// Stagehand server CLI.
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Ephemeral-storage workflow orchestration control plane")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Server host override
    #[arg(long)]
    host: Option<String>,

    /// Server port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        match ConfigLoader::load(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                // Can't trust a half-read configuration; bail out before
                // touching anything.
                eprintln!("unable to start: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = init_tracing(&config);
    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "no configuration file, using defaults");
    }

    let store = match Store::open(&config.database.path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "unable to open the store");
            std::process::exit(1);
        }
    };

    if !config.jobmanager.name.eq_ignore_ascii_case("slurm") {
        error!(name = %config.jobmanager.name, "unsupported job manager");
        std::process::exit(1);
    }
    let jobs: Arc<dyn JobManagerDriver> = Arc::new(SlurmJobManager::new(config.scheduler.clone()));

    let resources: Arc<dyn ResourceManagerDriver> =
        match config.resourcemanager.name.to_lowercase().as_str() {
            "remote" => Arc::new(RemoteResourceManager::new(&config.resourcemanager)),
            "none" => Arc::new(NoneResourceManager::new()),
            other => {
                error!(name = other, "unsupported resource manager");
                std::process::exit(1);
            }
        };
    info!(
        jobmanager = %config.jobmanager.name,
        resourcemanager = %config.resourcemanager.name,
        "drivers selected"
    );

    let lua = config.scheduler.lua_directives;
    let drivers = DriverSet::new(jobs.clone(), resources)
        .with_ephemeral(Arc::new(BurstBufferDriver::new(lua, jobs.clone())))
        .with_ephemeral(Arc::new(NamespaceExportDriver::new(lua, jobs.clone())))
        .with_ephemeral(Arc::new(CacheIndexDriver::new(lua, jobs.clone())))
        .with_ephemeral(Arc::new(NoneDriver::new()));

    let orchestrator = Arc::new(Orchestrator::new(store, drivers, config.orchestrator.clone()));

    let address = format!("{}:{}", config.server.host, config.server.port);
    info!(%address, "serving");
    api::serve(orchestrator, &address).await
}

/// Wire up tracing: env-filter level from configuration, stderr always,
/// plus a file sink when one is configured.
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.logging.path {
        Some(path) => {
            let path = PathBuf::from(path);
            let directory = path.parent().map(PathBuf::from).unwrap_or_else(|| ".".into());
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "stagehand.log".to_string());
            let appender = tracing_appender::rolling::never(directory, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    }
}
