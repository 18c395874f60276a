// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::job::JobDefinition;

/// Top-level jobs file as read from TOML.
///
/// ```toml
/// [job.backup]
/// executable = "pg_dump"
/// arguments = ["-f", "/var/backups/db.sql"]
/// schedule = "0 0 3 * * *"
/// timeout = "10m"
/// log_warning_after = "5m"
///
/// [job.heartbeat]
/// executable = "curl"
/// arguments = ["https://example.com/ping"]
/// schedule = "0 * * * * *"
/// skip_if_already_running = false
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawJobsFile {
    /// All jobs from `[job.<name>]`.
    ///
    /// Keys are the *job names* (e.g. `"backup"`, `"heartbeat"`).
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Path to the executable to launch.
    pub executable: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub arguments: Vec<String>,

    /// Cron expression handed to the trigger engine as-is.
    pub schedule: String,

    /// Disabled jobs are parsed but never scheduled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Optional duration string (e.g. `"30s"`, `"10m"`) capping run time.
    /// A run exceeding it is cancelled.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Also fire the job once, immediately, at startup.
    #[serde(default)]
    pub start_immediately: bool,

    /// Skip a firing when another firing of the same job is still running.
    #[serde(default = "default_skip_if_already_running")]
    pub skip_if_already_running: bool,

    /// Cancel the in-flight command when the application is shutting down.
    #[serde(default = "default_stop_if_application_stopping")]
    pub stop_if_application_stopping: bool,

    /// Duration string after which a still-running command logs a warning.
    #[serde(default)]
    pub log_warning_after: Option<String>,

    /// Duration string after which a still-running command logs an error.
    #[serde(default)]
    pub log_error_after: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_skip_if_already_running() -> bool {
    true
}

fn default_stop_if_application_stopping() -> bool {
    true
}

/// Validated jobs file: the runtime [`JobDefinition`]s, in name order.
#[derive(Debug, Clone)]
pub struct JobsFile {
    pub jobs: Vec<JobDefinition>,
}
