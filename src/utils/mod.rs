pub mod command;
pub mod pgpass;

use anyhow::{Context, Result};
use std::path::PathBuf;
use which::which;

/// Finds an executable in the system PATH.
pub fn find_executable(name: &str) -> Result<PathBuf> {
    which(name).with_context(|| format!("{name} executable not found in PATH"))
}

/// Whether `name` can be found in the system PATH.
pub fn binary_available(name: &str) -> bool {
    which(name).is_ok()
}
