// tests/supervisor_skip.rs

//! Concurrency-policy behaviour: skip-vs-run when firings overlap.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Level;
use uuid::Uuid;

use cronrun::engine::RunningJobs;
use cronrun::job::JobDefinition;
use cronrun::supervisor::{FiringContext, FiringOutcome, JobSupervisor};
use cronrun_test_utils::builders::JobDefinitionBuilder;
use cronrun_test_utils::fake_launcher::FakeLauncher;
use cronrun_test_utils::log_capture::LogSink;

fn ctx(job: &Arc<JobDefinition>) -> FiringContext {
    FiringContext {
        job: Arc::clone(job),
        firing: Uuid::new_v4(),
        shutdown: CancellationToken::new(),
    }
}

#[tokio::test]
async fn skips_when_another_firing_is_active() {
    let (logs, _guard) = LogSink::install();

    let running = RunningJobs::new();
    let launcher = FakeLauncher::new();
    let supervisor = JobSupervisor::new(Arc::new(launcher.clone()), running.clone());

    let job = Arc::new(
        JobDefinitionBuilder::new("backup")
            .skip_if_already_running(true)
            .build(),
    );

    // Another firing of the same job is mid-run.
    let _active = running.begin(job.id, Uuid::new_v4());

    let outcome = supervisor.execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::Skipped);
    assert_eq!(launcher.launch_count(), 0);
    assert!(logs.any(|r| {
        r.level == Level::WARN
            && r.message.contains("already running")
            && r.field("job") == Some("backup")
    }));
}

#[tokio::test]
async fn own_registration_does_not_trigger_a_skip() {
    let running = RunningJobs::new();
    let launcher = FakeLauncher::new();
    let supervisor = JobSupervisor::new(Arc::new(launcher.clone()), running.clone());

    let job = Arc::new(
        JobDefinitionBuilder::new("solo")
            .skip_if_already_running(true)
            .build(),
    );

    // The engine registers the firing before the supervisor runs; the
    // already-running check must exclude the firing's own entry.
    let ctx = ctx(&job);
    let _own = running.begin(job.id, ctx.firing);

    let outcome = supervisor.execute(ctx).await;

    assert_eq!(outcome, FiringOutcome::Succeeded);
    assert_eq!(launcher.launch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn overlapping_firings_allowed_when_policy_disabled() {
    let running = RunningJobs::new();
    let launcher = FakeLauncher::new();
    let supervisor = Arc::new(JobSupervisor::new(Arc::new(launcher.clone()), running.clone()));

    let job = Arc::new(
        JobDefinitionBuilder::new("overlapper")
            .skip_if_already_running(false)
            .duration_secs(1)
            .build(),
    );

    let mut handles = Vec::new();
    for _ in 0..2 {
        let ctx = ctx(&job);
        let guard = running.begin(job.id, ctx.firing);
        let supervisor = Arc::clone(&supervisor);
        handles.push(tokio::spawn(async move {
            let outcome = supervisor.execute(ctx).await;
            drop(guard);
            outcome
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), FiringOutcome::Succeeded);
    }
    assert_eq!(launcher.launch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn second_firing_skips_while_first_still_running() {
    let (logs, _guard) = LogSink::install();

    let running = RunningJobs::new();
    let launcher = FakeLauncher::new();
    let supervisor = Arc::new(JobSupervisor::new(Arc::new(launcher.clone()), running.clone()));

    // A 3-second command with the skip policy on; a second firing arrives
    // half a second after the first.
    let job = Arc::new(
        JobDefinitionBuilder::new("long-runner")
            .skip_if_already_running(true)
            .duration_secs(3)
            .build(),
    );

    let first_ctx = ctx(&job);
    let first_guard = running.begin(job.id, first_ctx.firing);
    let first = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            let outcome = supervisor.execute(first_ctx).await;
            drop(first_guard);
            outcome
        })
    };

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let second_ctx = ctx(&job);
    let _second_guard = running.begin(job.id, second_ctx.firing);
    let second = supervisor.execute(second_ctx).await;

    assert_eq!(second, FiringOutcome::Skipped);
    assert_eq!(first.await.unwrap(), FiringOutcome::Succeeded);

    // Only one command was ever started.
    assert_eq!(launcher.launch_count(), 1);
    assert!(logs.any(|r| r.level == Level::WARN && r.message.contains("already running")));
}
