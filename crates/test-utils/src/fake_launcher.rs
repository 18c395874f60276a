use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;

use cronrun::exec::{
    CommandError, CommandLauncher, CommandOutcome, ExecutionHandle, LaunchRequest,
};

/// One recorded launch.
#[derive(Debug, Clone)]
pub struct LaunchRecord {
    pub executable: String,
    pub arguments: Vec<String>,
}

/// A fake launcher that:
/// - records every launch
/// - simulates the command's duration from its first argument (seconds)
/// - reports a scripted exit code / stdout / stderr
/// - honors the request's timeout and cancellation token like the real one.
#[derive(Clone)]
pub struct FakeLauncher {
    launches: Arc<Mutex<Vec<LaunchRecord>>>,
    exit_code: i32,
    stdout: String,
    stderr: String,
    fail_spawn: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            launches: Arc::new(Mutex::new(Vec::new())),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            fail_spawn: false,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Every launch fails as if the executable did not exist.
    pub fn failing_spawn(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.launches.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLauncher for FakeLauncher {
    fn launch(&self, request: LaunchRequest) -> Result<ExecutionHandle, CommandError> {
        self.launches.lock().unwrap().push(LaunchRecord {
            executable: request.executable.clone(),
            arguments: request.arguments.clone(),
        });

        if self.fail_spawn {
            return Err(CommandError::Spawn {
                executable: request.executable,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such executable",
                ),
            });
        }

        let duration = request
            .arguments
            .first()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_default();

        let outcome = CommandOutcome {
            exit_code: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        };

        let (tx, rx) = oneshot::channel();
        let timeout = request.timeout;
        let cancel = request.cancel;

        tokio::spawn(async move {
            let deadline = async {
                match timeout {
                    Some(d) => sleep(d).await,
                    None => std::future::pending::<()>().await,
                }
            };

            let result = tokio::select! {
                _ = sleep(duration) => Ok(outcome),
                _ = deadline => Err(CommandError::TimedOut),
                _ = cancel.cancelled() => Err(CommandError::Cancelled),
            };

            let _ = tx.send(result);
        });

        Ok(ExecutionHandle::new(Some(4242), rx))
    }
}
