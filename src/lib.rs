// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod repo;
pub mod scope;
pub mod supervisor;

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::JobsFile;
use crate::config::loader::load_and_validate;
use crate::engine::{Engine, RunningJobs};
use crate::errors::Result;
use crate::exec::{CommandLauncher, ProcessCommandLauncher};
use crate::repo::{ConfigJobRepository, JobRepository};
use crate::scope::{ExecutionScopeManager, SharedServices};
use crate::supervisor::{COMMAND_JOB, JobSupervisor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - jobs-file loading
/// - the scope manager and its registered job factory
/// - trigger-engine registration
/// - Ctrl-C handling and graceful shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let file = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&file);
        return Ok(());
    }

    info!("service starting");

    let repository = ConfigJobRepository::new(file);
    let jobs = repository.list_jobs()?;

    let shutdown = CancellationToken::new();
    let running = RunningJobs::new();
    let launcher: Arc<dyn CommandLauncher> = Arc::new(ProcessCommandLauncher::new());

    let mut scopes = ExecutionScopeManager::new(SharedServices {
        launcher,
        running: running.clone(),
    });
    scopes.register(COMMAND_JOB, |scope| {
        Ok(Arc::new(JobSupervisor::new(scope.launcher(), scope.running())))
    });

    let engine = Engine::start(jobs, Arc::new(scopes), running, shutdown.clone()).await?;

    tokio::signal::ctrl_c().await?;

    info!("service stopping");
    shutdown.cancel();
    engine.shutdown().await?;
    info!("service stopped");

    Ok(())
}

/// Simple dry-run output: print jobs and their schedules.
fn print_dry_run(file: &JobsFile) {
    println!("cronrun dry-run");
    println!();

    println!("jobs ({}):", file.jobs.len());
    for job in &file.jobs {
        println!("  - {}", job.name);
        println!("      schedule: {}", job.schedule);
        println!("      executable: {}", job.executable);
        if !job.arguments.is_empty() {
            println!("      arguments: {:?}", job.arguments);
        }
        if !job.enabled {
            println!("      enabled: false");
        }
        if let Some(timeout) = job.timeout {
            println!("      timeout: {timeout:?}");
        }
        if job.start_immediately {
            println!("      start_immediately: true");
        }
        println!("      skip_if_already_running: {}", job.skip_if_already_running);
        println!(
            "      stop_if_application_stopping: {}",
            job.stop_if_application_stopping
        );
        if let Some(after) = job.log_warning_after {
            println!("      log_warning_after: {after:?}");
        }
        if let Some(after) = job.log_error_after {
            println!("      log_error_after: {after:?}");
        }
    }
}
