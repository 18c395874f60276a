// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::scope::ScopeError;

#[derive(Error, Debug)]
pub enum CronrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),

    #[error("Scope error: {0}")]
    ScopeError(#[from] ScopeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CronrunError>;
