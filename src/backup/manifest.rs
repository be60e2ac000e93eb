// zabbixbackup/src/backup/manifest.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::classify::FilterLists;
use crate::config::DumpFormat;

pub const MANIFEST_FILE: &str = "backup.json";

/// Description of a backup written next to the dump.
#[derive(Debug, Clone, Serialize)]
pub struct BackupManifest {
    pub name: String,
    pub host: String,
    pub version: String,
    pub timestamp: String,
    pub format: DumpFormat,
    pub filters: FilterLists,
    /// pg_dump arguments, no password is ever part of them.
    pub dump_args: Vec<String>,
    pub dump_file: String,
    pub saved_files: Vec<PathBuf>,
    pub tool_version: &'static str,
}

impl BackupManifest {
    pub fn write(&self, backup_dir: &Path) -> Result<PathBuf> {
        let path = backup_dir.join(MANIFEST_FILE);
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize backup manifest")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
