// src/job.rs

//! The job data model.
//!
//! A [`JobDefinition`] is loaded once at startup from the jobs file and
//! handed to the trigger engine; it is read-only for the rest of the process
//! lifetime. One firing of a job is identified by a [`FiringId`], distinct
//! per firing even for the same job.

use std::time::Duration;

use uuid::Uuid;

/// Stable identifier shared by all firings of the same configured job.
pub type JobId = Uuid;

/// Identifier of one firing of a job.
pub type FiringId = Uuid;

/// One scheduled external command, as configured in `[job.<name>]`.
#[derive(Debug, Clone)]
pub struct JobDefinition {
    /// Unique id, assigned at config load; stable across firings.
    pub id: JobId,

    /// Human-readable label used in log messages (the TOML table key).
    pub name: String,

    /// Disabled jobs are never registered with the trigger engine.
    pub enabled: bool,

    /// The command to launch.
    pub executable: String,
    pub arguments: Vec<String>,

    /// Opaque cron expression, consumed only by the trigger engine.
    pub schedule: String,

    /// Hard cap on run duration; exceeding it cancels the command.
    pub timeout: Option<Duration>,

    /// Register an extra fire-now trigger alongside the recurring one.
    pub start_immediately: bool,

    /// If true, a firing that finds another active firing of the same job
    /// skips instead of running.
    pub skip_if_already_running: bool,

    /// Whether host shutdown cancels this job's in-flight command.
    pub stop_if_application_stopping: bool,

    /// If the command has not completed after this long, log a warning.
    /// Advisory only; the command keeps running.
    pub log_warning_after: Option<Duration>,

    /// Same as `log_warning_after`, at error level.
    pub log_error_after: Option<Duration>,
}
