// src/repo.rs

//! Job definition repositories.
//!
//! The scheduler layer only ever sees [`JobRepository`]; today the single
//! implementation is backed by the loaded jobs file, but the trait is the
//! seam for a database-backed source later.

use crate::config::JobsFile;
use crate::errors::Result;
use crate::job::JobDefinition;

/// Source of the configured jobs.
pub trait JobRepository: Send + Sync {
    /// All configured jobs, including disabled ones; the caller filters by
    /// `enabled` before registration.
    fn list_jobs(&self) -> Result<Vec<JobDefinition>>;
}

/// Jobs-file-backed repository.
pub struct ConfigJobRepository {
    file: JobsFile,
}

impl ConfigJobRepository {
    pub fn new(file: JobsFile) -> Self {
        Self { file }
    }
}

impl JobRepository for ConfigJobRepository {
    fn list_jobs(&self) -> Result<Vec<JobDefinition>> {
        Ok(self.file.jobs.clone())
    }
}
