// src/supervisor/firing.rs

//! The per-firing supervisor state machine.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::running::RunningJobs;
use crate::exec::{CommandError, CommandLauncher, CommandOutcome, LaunchRequest};
use crate::job::{FiringId, JobDefinition};
use crate::scope::{JobTypeId, ScopedJob};
use crate::supervisor::monitor::MonitorSet;

/// Type token under which the command-job supervisor is registered with the
/// scope manager.
pub const COMMAND_JOB: JobTypeId = JobTypeId::new("command-job");

/// Everything one firing needs: the job, its own identity, and the host
/// shutdown signal.
#[derive(Debug, Clone)]
pub struct FiringContext {
    pub job: Arc<JobDefinition>,
    pub firing: FiringId,
    pub shutdown: CancellationToken,
}

/// Terminal state of one firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringOutcome {
    /// Another firing of the same job was active and the policy said skip.
    Skipped,
    /// The command ran and exited 0.
    Succeeded,
    /// The command ran and exited non-zero.
    Failed { exit_code: i32 },
    /// The command exceeded its timeout or was cancelled by shutdown.
    TimedOut,
    /// The command could not be launched or awaited.
    Faulted,
}

/// Executes one firing of one job to completion.
///
/// Every outcome is absorbed here and converted into exactly one primary
/// log line; nothing propagates back into the trigger engine, which would
/// otherwise treat a failed firing as a scheduler-level fault and re-fire
/// immediately.
pub struct JobSupervisor {
    launcher: Arc<dyn CommandLauncher>,
    running: RunningJobs,
}

impl JobSupervisor {
    pub fn new(launcher: Arc<dyn CommandLauncher>, running: RunningJobs) -> Self {
        Self { launcher, running }
    }

    pub async fn execute(&self, ctx: FiringContext) -> FiringOutcome {
        let job = ctx.job.as_ref();

        if job.skip_if_already_running && self.another_firing_active(&ctx) {
            warn!(job = %job.name, "job is already running; skipping");
            return FiringOutcome::Skipped;
        }

        debug!(job = %job.name, "job starting");

        // Host shutdown reaches the command only when the job opted in.
        let cancel = if job.stop_if_application_stopping {
            ctx.shutdown.clone()
        } else {
            CancellationToken::new()
        };

        let monitors = MonitorSet::start(job);
        let result = self.run_command(job, cancel).await;
        monitors.finish();

        let outcome = match result {
            Ok(out) if out.success() => {
                let trimmed = out.stdout.trim();
                if trimmed.is_empty() {
                    info!(job = %job.name, "job completed successfully");
                } else {
                    info!(job = %job.name, output = %trimmed, "job completed successfully");
                }
                FiringOutcome::Succeeded
            }
            Ok(out) => {
                error!(
                    job = %job.name,
                    exit_code = out.exit_code,
                    stderr = %out.stderr.trim(),
                    "job failed"
                );
                FiringOutcome::Failed {
                    exit_code: out.exit_code,
                }
            }
            Err(CommandError::TimedOut) => {
                error!(job = %job.name, "job timed out");
                FiringOutcome::TimedOut
            }
            Err(CommandError::Cancelled) => {
                error!(job = %job.name, "job cancelled by application shutdown");
                FiringOutcome::TimedOut
            }
            Err(err) => {
                error!(job = %job.name, error = %err, "job failed to run");
                FiringOutcome::Faulted
            }
        };

        debug!(job = %job.name, ?outcome, "job ending");
        outcome
    }

    /// Point-in-time snapshot: is a firing of this job, other than our own,
    /// currently executing?
    fn another_firing_active(&self, ctx: &FiringContext) -> bool {
        self.running
            .executing(ctx.job.id)
            .into_iter()
            .any(|firing| firing != ctx.firing)
    }

    async fn run_command(
        &self,
        job: &JobDefinition,
        cancel: CancellationToken,
    ) -> Result<CommandOutcome, CommandError> {
        let handle = self.launcher.launch(LaunchRequest {
            executable: job.executable.clone(),
            arguments: job.arguments.clone(),
            timeout: job.timeout,
            cancel,
        })?;

        if let Some(pid) = handle.pid() {
            debug!(job = %job.name, pid, "command started");
        }

        handle.wait().await
    }
}

impl ScopedJob for JobSupervisor {
    fn run(&self, ctx: FiringContext) -> Pin<Box<dyn Future<Output = FiringOutcome> + Send + '_>> {
        Box::pin(self.execute(ctx))
    }
}
