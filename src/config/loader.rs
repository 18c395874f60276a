// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{JobsFile, RawJobsFile};
use crate::errors::Result;

/// Load a jobs file from a given path and return the raw `RawJobsFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (duration parsing, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobsFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawJobsFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a jobs file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + default fns).
/// - Checks for:
///   - at least one `[job.<name>]` section,
///   - non-empty `executable` and `schedule`,
///   - well-formed duration strings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobsFile> {
    let raw = load_from_path(&path)?;
    let file = JobsFile::try_from(raw)?;
    Ok(file)
}

/// Helper to resolve a default jobs-file path.
///
/// Currently this just returns `Cronrun.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Cronrun.toml")
}
