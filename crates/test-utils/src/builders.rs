#![allow(dead_code)]

use std::time::Duration;

use cronrun::job::JobDefinition;
use uuid::Uuid;

/// A schedule that will not fire during any test run (leap day, midnight).
pub const SCHEDULE_NEVER: &str = "0 0 0 29 2 *";

/// A schedule that fires every second.
pub const SCHEDULE_EVERY_SECOND: &str = "* * * * * *";

/// Builder for `JobDefinition` to simplify test setup.
///
/// Defaults match a job that runs instantly and allows overlap, so each test
/// only states what it cares about.
pub struct JobDefinitionBuilder {
    job: JobDefinition,
}

impl JobDefinitionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            job: JobDefinition {
                id: Uuid::new_v4(),
                name: name.to_string(),
                enabled: true,
                executable: "example-exe".to_string(),
                // The fake launcher reads the simulated duration (seconds)
                // from the first argument.
                arguments: vec!["0".to_string()],
                schedule: SCHEDULE_NEVER.to_string(),
                timeout: None,
                start_immediately: false,
                skip_if_already_running: false,
                stop_if_application_stopping: true,
                log_warning_after: None,
                log_error_after: None,
            },
        }
    }

    pub fn executable(mut self, executable: &str) -> Self {
        self.job.executable = executable.to_string();
        self
    }

    pub fn arguments(mut self, arguments: &[&str]) -> Self {
        self.job.arguments = arguments.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience for the fake launcher: a command lasting `seconds`.
    pub fn duration_secs(self, seconds: u64) -> Self {
        let arg = seconds.to_string();
        self.arguments(&[arg.as_str()])
    }

    pub fn schedule(mut self, schedule: &str) -> Self {
        self.job.schedule = schedule.to_string();
        self
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.job.enabled = val;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.job.timeout = Some(timeout);
        self
    }

    pub fn start_immediately(mut self, val: bool) -> Self {
        self.job.start_immediately = val;
        self
    }

    pub fn skip_if_already_running(mut self, val: bool) -> Self {
        self.job.skip_if_already_running = val;
        self
    }

    pub fn stop_if_application_stopping(mut self, val: bool) -> Self {
        self.job.stop_if_application_stopping = val;
        self
    }

    pub fn log_warning_after(mut self, after: Duration) -> Self {
        self.job.log_warning_after = Some(after);
        self
    }

    pub fn log_error_after(mut self, after: Duration) -> Self {
        self.job.log_error_after = Some(after);
        self
    }

    pub fn build(self) -> JobDefinition {
        self.job
    }
}
