// src/engine/mod.rs

//! Trigger-engine integration.
//!
//! This module ties together:
//! - registration of enabled jobs with the external cron scheduler
//!   (`tokio-cron-scheduler`), including the extra fire-now trigger for
//!   `start_immediately` jobs
//! - the per-firing pipeline: register in [`running::RunningJobs`], acquire
//!   a scoped supervisor instance, execute, release the scope
//! - graceful shutdown of the scheduler and in-flight commands
//!
//! Cron-expression evaluation and trigger timing belong entirely to the
//! external scheduler; nothing here parses a schedule.

pub mod running;
pub mod trigger;

pub use running::{RunningGuard, RunningJobs};
pub use trigger::Engine;
