// zabbixbackup/src/backup/save_files.rs
//! Copies of the Zabbix configuration files kept alongside the dump.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const DEFAULT_FILES: &[&str] = &["/etc/zabbix/", "/usr/lib/zabbix/"];

/// Subdirectory of the backup mirroring the filesystem root.
const ROOT_DIR: &str = "root";

/// One path per line, blank lines and `#` comments skipped.
pub fn parse_file_list(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}

pub fn read_file_list(list: Option<&Path>) -> Result<Vec<PathBuf>> {
    match list {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file list {}", path.display()))?;
            Ok(parse_file_list(&contents))
        }
        None => Ok(DEFAULT_FILES.iter().map(PathBuf::from).collect()),
    }
}

/// Where `source` lands inside the backup: `<backup>/root/<source>`.
pub fn destination_for(backup_dir: &Path, source: &Path) -> PathBuf {
    let relative: PathBuf = source
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    backup_dir.join(ROOT_DIR).join(relative)
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(source, dest)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;
    Ok(())
}

/// Copies every listed path into the backup. Missing paths are skipped.
/// Returns the paths that were copied.
pub fn save_files(backup_dir: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut saved = Vec::new();

    for source in paths {
        if !source.exists() {
            warn!(path = %source.display(), "Path to save does not exist, skipping");
            continue;
        }

        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
            let dest = destination_for(backup_dir, entry.path());
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)
                    .with_context(|| format!("Failed to create {}", dest.display()))?;
            } else if entry.file_type().is_file() {
                debug!(from = %entry.path().display(), to = %dest.display(), "Copying file");
                copy_file(entry.path(), &dest)?;
            }
        }

        info!(path = %source.display(), "Saved");
        saved.push(source.clone());
    }

    Ok(saved)
}
