// src/engine/running.rs

//! Registry of currently-executing firings.
//!
//! The supervisor asks this registry "is another firing of this job active?"
//! before launching. Entries are added by the engine just before a firing
//! starts and removed (via guard drop) when it finishes, so the answer is a
//! point-in-time snapshot: two near-simultaneous firings may both see "not
//! running" and both proceed. That imprecision is accepted; the skip policy
//! is advisory concurrency control, not mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::job::{FiringId, JobId};

/// Concurrency-safe table of in-flight firings, keyed by job identity.
///
/// Cheap to clone; all clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct RunningJobs {
    inner: Arc<Mutex<HashMap<JobId, Vec<FiringId>>>>,
}

impl RunningJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a firing as executing. The returned guard unregisters it
    /// when dropped, so a firing can never stay registered past its end.
    pub fn begin(&self, job: JobId, firing: FiringId) -> RunningGuard {
        self.table().entry(job).or_default().push(firing);
        RunningGuard {
            registry: self.clone(),
            job,
            firing,
        }
    }

    /// Firing ids currently executing for the given job, self included.
    pub fn executing(&self, job: JobId) -> Vec<FiringId> {
        self.table().get(&job).cloned().unwrap_or_default()
    }

    /// Total number of in-flight firings across all jobs.
    pub fn total(&self) -> usize {
        self.table().values().map(Vec::len).sum()
    }

    fn end(&self, job: JobId, firing: FiringId) {
        let mut table = self.table();
        if let Some(firings) = table.get_mut(&job) {
            firings.retain(|f| *f != firing);
            if firings.is_empty() {
                table.remove(&job);
            }
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<JobId, Vec<FiringId>>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Removes its firing from the registry on drop.
#[derive(Debug)]
pub struct RunningGuard {
    registry: RunningJobs,
    job: JobId,
    firing: FiringId,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.registry.end(self.job, self.firing);
    }
}
