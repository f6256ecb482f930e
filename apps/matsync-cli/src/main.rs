//! matsync entry point.

mod archive;
mod bridge;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use matsync_sync_job::registry::sync_target;
use matsync_sync_job::{MachineRegistry, MaterialSyncJob, PrinterRegistry, SyncEvent};
use tracing_subscriber::EnvFilter;

use crate::archive::PackagedArchive;
use crate::bridge::CloudTransport;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "matsync", version, about = "Sync material profiles to cloud printers")]
struct Cli {
    /// Configuration file (defaults to the platform config path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload the material archive and confirm it with every eligible printer.
    Sync,
    /// List the printers that would be synced.
    Targets,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Sync => sync(config).await,
        Command::Targets => {
            targets(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn targets(config: &AppConfig) {
    for record in &config.printers {
        if let Some(target) = sync_target(record) {
            println!("{:<24} {:<40} {}", record.name, target.printer_id, target.cluster_id);
        }
    }
}

async fn sync(config: AppConfig) -> anyhow::Result<ExitCode> {
    let source = config
        .archive
        .clone()
        .context("no material archive configured (set `archive` in the config file)")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_root = %config.sync.api_root,
        "starting material sync"
    );

    let registry = Arc::new(MachineRegistry::new(config.printers.clone()));
    let client = matsync_cloud::Client::new(&config.token, config.timeout())?;
    let mut job = MaterialSyncJob::new(
        config.sync.clone(),
        Arc::new(CloudTransport::new(client)),
        Arc::new(PackagedArchive::new(source)),
    )
    .with_registry(registry.clone());
    let mut events = job.take_events().context("event stream already taken")?;

    job.start_registered()?;

    let mut last_percent = None;
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            SyncEvent::Progress { progress, .. } => {
                let percent = (progress * 100.0).round() as u32;
                if last_percent != Some(percent) {
                    println!("syncing... {percent:>3}%");
                    last_percent = Some(percent);
                }
            }
            SyncEvent::Completed(done) => {
                outcome = Some(done);
                break;
            }
        }
    }
    let outcome = outcome.context("sync ended without a result")?;

    let status = job.status();
    for target in registry.list_sync_targets() {
        if let Some(s) = status.get(&target.printer_id) {
            println!("{:<40} {s}", target.printer_id);
        }
    }

    if let Some(path) = job.archive_path() {
        if config.keep_archive {
            println!("archive kept at {}", path.display());
        } else if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not remove temporary archive");
        }
    }

    match outcome.error {
        None => {
            println!("materials synced");
            Ok(ExitCode::SUCCESS)
        }
        Some(e) => {
            tracing::error!(error = %e, "material sync failed");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
