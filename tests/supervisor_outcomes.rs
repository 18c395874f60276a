// tests/supervisor_outcomes.rs

//! Primary outcome reporting: success, failure, timeout, fault, shutdown.

use std::sync::Arc;
use std::time::Duration;

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

fn supervisor(launcher: &FakeLauncher) -> JobSupervisor {
    JobSupervisor::new(Arc::new(launcher.clone()), RunningJobs::new())
}

#[tokio::test]
async fn success_logs_trimmed_stdout_once() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new().with_stdout("hello world\n\n");
    let job = Arc::new(JobDefinitionBuilder::new("greeter").build());

    let outcome = supervisor(&launcher).execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::Succeeded);
    assert_eq!(
        logs.count(|r| r.level == Level::INFO && r.message.contains("completed successfully")),
        1
    );
    assert!(logs.any(|r| r.field("output") == Some("hello world")));
    assert_eq!(logs.count(|r| r.level == Level::ERROR), 0);
}

#[tokio::test]
async fn success_with_empty_stdout_omits_output_field() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new().with_stdout("\n");
    let job = Arc::new(JobDefinitionBuilder::new("quiet").build());

    let outcome = supervisor(&launcher).execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::Succeeded);
    assert_eq!(
        logs.count(|r| r.level == Level::INFO && r.message.contains("completed successfully")),
        1
    );
    assert!(!logs.any(|r| r.field("output").is_some()));
}

#[tokio::test]
async fn nonzero_exit_logs_exit_code_and_trimmed_stderr() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new().with_exit_code(3).with_stderr("boom\n");
    let job = Arc::new(JobDefinitionBuilder::new("crasher").build());

    let outcome = supervisor(&launcher).execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::Failed { exit_code: 3 });
    assert_eq!(
        logs.count(|r| r.level == Level::ERROR && r.message.contains("job failed")),
        1
    );
    assert!(logs.any(|r| {
        r.field("exit_code") == Some("3") && r.field("stderr") == Some("boom")
    }));
    assert_eq!(logs.count(|r| r.level == Level::INFO), 0);
}

#[tokio::test(start_paused = true)]
async fn timeout_produces_a_single_timed_out_log() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new();
    let job = Arc::new(
        JobDefinitionBuilder::new("sleeper")
            .duration_secs(5)
            .timeout(Duration::from_secs(1))
            .build(),
    );

    let outcome = supervisor(&launcher).execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::TimedOut);
    assert_eq!(
        logs.count(|r| r.level == Level::ERROR && r.message.contains("timed out")),
        1
    );
    // No non-zero-exit log for the same firing.
    assert_eq!(logs.count(|r| r.level == Level::ERROR), 1);
    assert_eq!(launcher.launch_count(), 1);
}

#[tokio::test]
async fn spawn_failure_is_absorbed_as_faulted() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new().failing_spawn();
    let job = Arc::new(JobDefinitionBuilder::new("ghost").build());

    let outcome = supervisor(&launcher).execute(ctx(&job)).await;

    assert_eq!(outcome, FiringOutcome::Faulted);
    assert!(logs.any(|r| {
        r.level == Level::ERROR
            && r.message.contains("failed to run")
            && r.field("error").is_some_and(|e| e.contains("failed to spawn"))
    }));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_command_when_opted_in() {
    let (logs, _guard) = LogSink::install();

    let launcher = FakeLauncher::new();
    let job = Arc::new(
        JobDefinitionBuilder::new("stoppable")
            .duration_secs(5)
            .stop_if_application_stopping(true)
            .build(),
    );

    let shutdown = CancellationToken::new();
    let ctx = FiringContext {
        job: Arc::clone(&job),
        firing: Uuid::new_v4(),
        shutdown: shutdown.clone(),
    };

    let supervisor = supervisor(&launcher);
    let task = tokio::spawn(async move { supervisor.execute(ctx).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown.cancel();

    assert_eq!(task.await.unwrap(), FiringOutcome::TimedOut);
    assert!(logs.any(|r| r.message.contains("cancelled by application shutdown")));
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_ignored_when_opted_out() {
    let launcher = FakeLauncher::new();
    let job = Arc::new(
        JobDefinitionBuilder::new("unstoppable")
            .duration_secs(1)
            .stop_if_application_stopping(false)
            .build(),
    );

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let ctx = FiringContext {
        job: Arc::clone(&job),
        firing: Uuid::new_v4(),
        shutdown,
    };

    let outcome = supervisor(&launcher).execute(ctx).await;

    assert_eq!(outcome, FiringOutcome::Succeeded);
}
