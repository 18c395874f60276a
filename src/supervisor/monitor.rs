// src/supervisor/monitor.rs

//! Advisory duration monitors.
//!
//! Each monitor is an independent delay timer racing against a shared
//! cancellation token. If the delay elapses first, the monitor emits its
//! advisory log line and completes; it never cancels or otherwise affects
//! the command. The supervisor cancels the shared token the instant the
//! command completes, so no monitor fires after the job has finished and
//! none is left running in the background.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::job::JobDefinition;

/// The duration monitors of one firing, joined by a shared cancellation
/// token. Fire-and-forget: the supervisor never awaits the monitor tasks.
pub(crate) struct MonitorSet {
    cancel: CancellationToken,
}

enum AdvisoryLevel {
    Warning,
    Error,
}

impl MonitorSet {
    /// Spawn zero, one, or two monitors for the job's configured thresholds.
    pub(crate) fn start(job: &JobDefinition) -> Self {
        let cancel = CancellationToken::new();

        if let Some(after) = job.log_warning_after {
            spawn_monitor(job.name.clone(), after, AdvisoryLevel::Warning, cancel.clone());
        }
        if let Some(after) = job.log_error_after {
            spawn_monitor(job.name.clone(), after, AdvisoryLevel::Error, cancel.clone());
        }

        Self { cancel }
    }

    /// Cancel all monitors; called when the command completes.
    pub(crate) fn finish(&self) {
        self.cancel.cancel();
    }
}

impl Drop for MonitorSet {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_monitor(job: String, after: Duration, level: AdvisoryLevel, cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(after) => match level {
                AdvisoryLevel::Warning => {
                    warn!(job = %job, "job is running longer than expected");
                }
                AdvisoryLevel::Error => {
                    error!(job = %job, "job is running longer than expected");
                }
            },
        }
    });
}
