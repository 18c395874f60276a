// src/config/validate.rs

use std::time::Duration;

use uuid::Uuid;

use crate::config::model::{JobConfig, JobsFile, RawJobsFile};
use crate::errors::{CronrunError, Result};
use crate::job::JobDefinition;

impl TryFrom<RawJobsFile> for JobsFile {
    type Error = CronrunError;

    fn try_from(raw: RawJobsFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_jobs(&raw)?;

        let mut jobs = Vec::with_capacity(raw.job.len());
        for (name, cfg) in raw.job {
            jobs.push(job_from_config(name, cfg)?);
        }

        Ok(JobsFile { jobs })
    }
}

fn ensure_has_jobs(raw: &RawJobsFile) -> Result<()> {
    if raw.job.is_empty() {
        return Err(CronrunError::ConfigError(
            "jobs file must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn job_from_config(name: String, cfg: JobConfig) -> Result<JobDefinition> {
    if cfg.executable.trim().is_empty() {
        return Err(CronrunError::ConfigError(format!(
            "job '{name}' has an empty `executable`"
        )));
    }
    if cfg.schedule.trim().is_empty() {
        return Err(CronrunError::ConfigError(format!(
            "job '{name}' has an empty `schedule`"
        )));
    }

    Ok(JobDefinition {
        id: Uuid::new_v4(),
        timeout: parse_optional_duration(&name, "timeout", cfg.timeout.as_deref())?,
        log_warning_after: parse_optional_duration(
            &name,
            "log_warning_after",
            cfg.log_warning_after.as_deref(),
        )?,
        log_error_after: parse_optional_duration(
            &name,
            "log_error_after",
            cfg.log_error_after.as_deref(),
        )?,
        name,
        enabled: cfg.enabled,
        executable: cfg.executable,
        arguments: cfg.arguments,
        schedule: cfg.schedule,
        start_immediately: cfg.start_immediately,
        skip_if_already_running: cfg.skip_if_already_running,
        stop_if_application_stopping: cfg.stop_if_application_stopping,
    })
}

fn parse_optional_duration(
    job: &str,
    field: &str,
    value: Option<&str>,
) -> Result<Option<Duration>> {
    match value {
        None => Ok(None),
        Some(s) => parse_duration(s).map(Some).map_err(|e| {
            CronrunError::ConfigError(format!("job '{job}' has invalid `{field}`: {e}"))
        }),
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{unit}'; expected ms, s, m, or h"
        )),
    }
}
