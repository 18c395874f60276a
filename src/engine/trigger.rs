// src/engine/trigger.rs

//! Job registration and the per-firing pipeline.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::engine::running::RunningJobs;
use crate::errors::Result;
use crate::job::JobDefinition;
use crate::scope::ExecutionScopeManager;
use crate::supervisor::{COMMAND_JOB, FiringContext};

/// The running trigger engine: owns the external scheduler plus the shared
/// firing state. Dropping it without [`Engine::shutdown`] leaves in-flight
/// commands to be killed by their kill-on-drop handles.
pub struct Engine {
    sched: JobScheduler,
    shutdown: CancellationToken,
}

impl Engine {
    /// Register every enabled job with the external scheduler and start it.
    ///
    /// Each job gets a recurring cron trigger; `start_immediately` jobs get
    /// an extra one-shot trigger that fires right away.
    pub async fn start(
        jobs: Vec<JobDefinition>,
        scopes: Arc<ExecutionScopeManager>,
        running: RunningJobs,
        shutdown: CancellationToken,
    ) -> Result<Engine> {
        let sched = JobScheduler::new().await?;

        let mut registered = 0usize;
        for job in jobs.into_iter().filter(|j| j.enabled) {
            let job = Arc::new(job);

            let cron = Job::new_async(
                job.schedule.as_str(),
                firing_closure(
                    Arc::clone(&job),
                    Arc::clone(&scopes),
                    running.clone(),
                    shutdown.clone(),
                ),
            )?;
            sched.add(cron).await?;

            if job.start_immediately {
                let immediate = Job::new_one_shot_async(
                    Duration::from_secs(0),
                    firing_closure(
                        Arc::clone(&job),
                        Arc::clone(&scopes),
                        running.clone(),
                        shutdown.clone(),
                    ),
                )?;
                sched.add(immediate).await?;
            }

            debug!(job = %job.name, schedule = %job.schedule, "job registered");
            registered += 1;
        }

        sched.start().await?;
        info!(job_count = registered, "trigger engine started");

        Ok(Engine { sched, shutdown })
    }

    /// Signal used to stop in-flight commands of opted-in jobs.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel in-flight commands (for jobs that opted in) and stop the
    /// external scheduler.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        self.sched.shutdown().await?;
        Ok(())
    }
}

/// Build the closure the external scheduler invokes on every trigger of one
/// job. Each invocation runs the full firing pipeline.
fn firing_closure(
    job: Arc<JobDefinition>,
    scopes: Arc<ExecutionScopeManager>,
    running: RunningJobs,
    shutdown: CancellationToken,
) -> impl FnMut(Uuid, JobScheduler) -> Pin<Box<dyn Future<Output = ()> + Send>>
+ Send
+ Sync
+ 'static {
    move |_trigger_id, _sched| {
        let job = Arc::clone(&job);
        let scopes = Arc::clone(&scopes);
        let running = running.clone();
        let shutdown = shutdown.clone();

        Box::pin(async move {
            run_firing(job, scopes, running, shutdown).await;
        })
    }
}

/// One firing, end to end: track it as executing, materialize a scoped
/// supervisor, run it, release the scope.
///
/// The firing is registered *before* the supervisor's already-running check
/// so that the check sees every live firing and excludes itself, mirroring
/// how the scheduler reports currently-executing instances.
pub(crate) async fn run_firing(
    job: Arc<JobDefinition>,
    scopes: Arc<ExecutionScopeManager>,
    running: RunningJobs,
    shutdown: CancellationToken,
) {
    let firing = Uuid::new_v4();
    let _guard = running.begin(job.id, firing);

    let instance = match scopes.acquire(COMMAND_JOB) {
        Ok(instance) => instance,
        // A construction failure means a misconfigured service graph, not a
        // job failure; surface it at the scheduler layer and fire nothing.
        Err(err) => {
            error!(job = %job.name, error = %err, "unable to materialize job instance");
            return;
        }
    };

    let ctx = FiringContext {
        job: Arc::clone(&job),
        firing,
        shutdown,
    };
    instance.job.run(ctx).await;

    if let Err(err) = scopes.release(instance.id) {
        error!(job = %job.name, error = %err, "failed to release execution scope");
    }
}
