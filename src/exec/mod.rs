// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually launching the external commands
//! configured on jobs, using `tokio::process::Command`, and handing the
//! supervisor an awaitable handle to the eventual result.
//!
//! - [`launcher`] provides the `CommandLauncher` trait and the concrete
//!   `ProcessCommandLauncher` used in production; tests can replace it with
//!   a fake implementation.

pub mod launcher;

pub use launcher::{
    CommandError, CommandLauncher, CommandOutcome, ExecutionHandle, LaunchRequest,
    ProcessCommandLauncher,
};
