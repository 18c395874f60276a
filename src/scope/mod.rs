// src/scope/mod.rs

//! Per-execution dependency scopes.
//!
//! Each concurrent job instance gets its own [`ExecutionScope`], so that
//! per-firing dependencies are never shared across concurrent firings while
//! process-wide services (the command launcher, the running-firings
//! registry) remain shared. The manager tracks instance→scope and releases
//! each scope exactly once, whether the firing succeeds, fails, or the
//! instance can't even be constructed.
//!
//! Job instantiation is an explicit registry: a [`JobTypeId`] type token
//! maps to a factory closure that resolves a [`ScopedJob`] out of a fresh
//! scope. No reflection, no implicit thread-local state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::error;

use crate::engine::running::RunningJobs;
use crate::exec::CommandLauncher;
use crate::supervisor::{FiringContext, FiringOutcome};

/// Identity of a scoped job instance, unique per `acquire`.
pub type InstanceId = u64;

/// Type token naming a registered job kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobTypeId(&'static str);

impl JobTypeId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("unknown job type '{0}'")]
    UnknownJobType(&'static str),

    #[error("unable to construct job instance of type '{job_type}': {source}")]
    Construction {
        job_type: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("job instance {0} is already tracked")]
    DuplicateInstance(InstanceId),

    #[error("no tracked scope for job instance {0}")]
    UntrackedInstance(InstanceId),
}

/// Process-wide services shared by every scope.
pub struct SharedServices {
    pub launcher: Arc<dyn CommandLauncher>,
    pub running: RunningJobs,
}

/// The isolated resource scope of one job instance.
///
/// Holds the per-firing view of the service graph; dropped when the
/// instance is released.
pub struct ExecutionScope {
    shared: Arc<SharedServices>,
}

impl ExecutionScope {
    pub fn launcher(&self) -> Arc<dyn CommandLauncher> {
        Arc::clone(&self.shared.launcher)
    }

    pub fn running(&self) -> RunningJobs {
        self.shared.running.clone()
    }
}

/// A job instance resolved from a scope.
pub trait ScopedJob: Send + Sync {
    fn run(&self, ctx: FiringContext) -> Pin<Box<dyn Future<Output = FiringOutcome> + Send + '_>>;
}

type JobFactory = Box<dyn Fn(&ExecutionScope) -> anyhow::Result<Arc<dyn ScopedJob>> + Send + Sync>;

/// A resolved instance together with the token needed to release it.
pub struct ScopedInstance {
    pub id: InstanceId,
    pub job: Arc<dyn ScopedJob>,
}

impl std::fmt::Debug for ScopedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedInstance")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Creates and tracks one scope per concurrent job instance.
pub struct ExecutionScopeManager {
    shared: Arc<SharedServices>,
    factories: HashMap<JobTypeId, JobFactory>,
    scopes: Mutex<HashMap<InstanceId, ExecutionScope>>,
    next_instance: AtomicU64,
}

impl ExecutionScopeManager {
    pub fn new(shared: SharedServices) -> Self {
        Self {
            shared: Arc::new(shared),
            factories: HashMap::new(),
            scopes: Mutex::new(HashMap::new()),
            next_instance: AtomicU64::new(1),
        }
    }

    /// Register the factory for a job type. Later registrations for the
    /// same token replace earlier ones.
    pub fn register<F>(&mut self, job_type: JobTypeId, factory: F)
    where
        F: Fn(&ExecutionScope) -> anyhow::Result<Arc<dyn ScopedJob>> + Send + Sync + 'static,
    {
        self.factories.insert(job_type, Box::new(factory));
    }

    /// Construct a new scope and resolve a job instance from it.
    ///
    /// If construction fails the scope is released before the error
    /// propagates; a scope is never left tracked on the failure path.
    pub fn acquire(&self, job_type: JobTypeId) -> Result<ScopedInstance, ScopeError> {
        let factory = self
            .factories
            .get(&job_type)
            .ok_or(ScopeError::UnknownJobType(job_type.name()))?;

        let scope = ExecutionScope {
            shared: Arc::clone(&self.shared),
        };

        let job = match factory(&scope) {
            Ok(job) => job,
            Err(source) => {
                error!(
                    job_type = job_type.name(),
                    error = %source,
                    "unable to construct job instance"
                );
                drop(scope);
                return Err(ScopeError::Construction {
                    job_type: job_type.name(),
                    source,
                });
            }
        };

        let id = self.next_instance.fetch_add(1, Ordering::Relaxed);

        match self.table().entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(scope);
            }
            // The counter makes this unreachable in practice; if it ever
            // happens the fresh scope is dropped here rather than clobbering
            // the tracked one.
            Entry::Occupied(_) => {
                return Err(ScopeError::DuplicateInstance(id));
            }
        }

        Ok(ScopedInstance { id, job })
    }

    /// Release the scope of a previously acquired instance.
    ///
    /// Releasing an id that is not tracked is an internal-consistency error
    /// (a lifecycle bug in the caller), not a silent success.
    pub fn release(&self, id: InstanceId) -> Result<(), ScopeError> {
        match self.table().remove(&id) {
            Some(scope) => {
                drop(scope);
                Ok(())
            }
            None => Err(ScopeError::UntrackedInstance(id)),
        }
    }

    /// Number of currently tracked scopes.
    pub fn tracked(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<InstanceId, ExecutionScope>> {
        match self.scopes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
