// src/exec/launcher.rs

//! Command launching and result capture.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What a finished command reported back.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a command did not produce a [`CommandOutcome`].
///
/// The supervisor branches on these variants directly; timeouts and
/// shutdown cancellations are distinguishable from launch failures.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command exceeded its timeout")]
    TimedOut,

    #[error("command cancelled by shutdown")]
    Cancelled,

    #[error("failed to spawn '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for command: {0}")]
    Wait(#[source] std::io::Error),
}

/// Everything needed to launch one command.
#[derive(Debug)]
pub struct LaunchRequest {
    pub executable: String,
    pub arguments: Vec<String>,

    /// Hard cap on run duration; the process is killed when it elapses.
    pub timeout: Option<Duration>,

    /// Cancelling this token kills the process.
    pub cancel: CancellationToken,
}

/// Handle to a launched command: its process id plus the awaitable outcome.
///
/// Exactly one handle exists per in-flight firing; awaiting it consumes it.
#[derive(Debug)]
pub struct ExecutionHandle {
    pid: Option<u32>,
    outcome: oneshot::Receiver<Result<CommandOutcome, CommandError>>,
}

impl ExecutionHandle {
    pub fn new(
        pid: Option<u32>,
        outcome: oneshot::Receiver<Result<CommandOutcome, CommandError>>,
    ) -> Self {
        Self { pid, outcome }
    }

    /// OS process id of the launched command, when known.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the command to finish, be killed, or fail.
    pub async fn wait(self) -> Result<CommandOutcome, CommandError> {
        match self.outcome.await {
            Ok(result) => result,
            Err(_) => Err(CommandError::Wait(std::io::Error::other(
                "command task dropped without reporting an outcome",
            ))),
        }
    }
}

/// Trait abstracting how commands are launched.
///
/// Production code uses [`ProcessCommandLauncher`]; tests can provide their
/// own implementation that doesn't spawn real processes.
pub trait CommandLauncher: Send + Sync {
    /// Start the command and return a handle to its eventual outcome.
    ///
    /// Launching is synchronous (the process either spawns or it doesn't);
    /// only waiting for completion is asynchronous.
    fn launch(&self, request: LaunchRequest) -> Result<ExecutionHandle, CommandError>;
}

/// Real command launcher used in production.
///
/// Spawns the process with piped stdout/stderr, drains both pipes off the
/// caller's task, and races process exit against the timeout and the
/// cancellation token. The process is killed when either wins the race.
#[derive(Debug, Default)]
pub struct ProcessCommandLauncher;

impl ProcessCommandLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl CommandLauncher for ProcessCommandLauncher {
    fn launch(&self, request: LaunchRequest) -> Result<ExecutionHandle, CommandError> {
        let mut cmd = Command::new(&request.executable);
        cmd.args(&request.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            executable: request.executable.clone(),
            source,
        })?;

        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result =
                supervise_child(child, stdout, stderr, request.timeout, request.cancel).await;
            // The receiver may be gone if the firing was abandoned; the child
            // has already exited or been killed by this point either way.
            let _ = tx.send(result);
        });

        Ok(ExecutionHandle::new(pid, rx))
    }
}

async fn supervise_child(
    mut child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
) -> Result<CommandOutcome, CommandError> {
    // Drain both pipes concurrently so the child never blocks on a full
    // pipe buffer while we wait for it.
    let stdout_task = tokio::spawn(read_capture(stdout));
    let stderr_task = tokio::spawn(read_capture(stderr));

    let deadline = async {
        match timeout {
            Some(d) => sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(CommandError::Wait)?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();

            let exit_code = status.code().unwrap_or(-1);
            debug!(exit_code, "command process exited");

            Ok(CommandOutcome { exit_code, stdout, stderr })
        }

        _ = deadline => {
            kill_child(&mut child).await;
            Err(CommandError::TimedOut)
        }

        _ = cancel.cancelled() => {
            kill_child(&mut child).await;
            Err(CommandError::Cancelled)
        }
    }
}

async fn kill_child(child: &mut Child) {
    if let Err(err) = child.kill().await {
        warn!(error = %err, "failed to kill command process");
    }
}

async fn read_capture<R>(pipe: Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return String::new();
    };

    let mut buf = Vec::new();
    if let Err(err) = pipe.read_to_end(&mut buf).await {
        debug!(error = %err, "failed reading command output");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
