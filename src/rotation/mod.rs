//! Retention of previous backups.
//!
//! Rotation runs as scan → filter → sort → prune. Only backups sharing the
//! current `(host, version)` identity are ever considered, so instances and
//! database versions sharing one output directory keep independent histories.
//! A retention count of `0` keeps everything.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::backup::naming::parse_backup_name;
use crate::errors::{BackupError, Result};

/// A previous backup found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub host: String,
    pub timestamp: u64,
    pub version: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl BackupEntry {
    /// Parses the final component of `path`; `None` when it does not follow
    /// the backup naming convention.
    pub fn parse(path: &Path, is_directory: bool) -> Option<Self> {
        let name = parse_backup_name(path.file_name()?.to_str()?)?;
        Some(Self {
            host: name.host,
            timestamp: name.timestamp,
            version: name.version,
            path: path.to_path_buf(),
            is_directory,
        })
    }
}

/// Scoping key of a backup history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub host: String,
    pub version: String,
}

impl Identity {
    pub fn new(host: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
        }
    }

    fn owns(&self, entry: &BackupEntry) -> bool {
        entry.host == self.host && entry.version == self.version
    }
}

/// Outcome of filtering and sorting, before anything is deleted. Both lists
/// are oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationPlan {
    pub keep: Vec<BackupEntry>,
    pub remove: Vec<BackupEntry>,
}

#[derive(Debug, Default)]
pub struct RotationReport {
    pub kept: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Deletions that failed; pruning continued past them.
    pub failed: Vec<(PathBuf, io::Error)>,
}

/// Lists direct children of `dir` that follow the backup naming convention.
/// Anything else is left alone.
pub fn scan(dir: &Path) -> Result<Vec<BackupEntry>> {
    let scan_error = |source| BackupError::RotationScan {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for item in fs::read_dir(dir).map_err(scan_error)? {
        // Children vanishing mid-scan are simply not candidates.
        let Ok(item) = item else { continue };
        let Ok(file_type) = item.file_type() else { continue };

        if let Some(entry) = BackupEntry::parse(&item.path(), file_type.is_dir()) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Keeps the newest `keep` backups of `identity`; entries of other
/// identities never appear in the plan.
pub fn plan(entries: Vec<BackupEntry>, identity: &Identity, keep: usize) -> RotationPlan {
    let mut owned: Vec<BackupEntry> = entries
        .into_iter()
        .filter(|entry| identity.owns(entry))
        .collect();
    owned.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));

    if keep == 0 {
        return RotationPlan {
            keep: owned,
            remove: Vec::new(),
        };
    }

    let split = owned.len().saturating_sub(keep);
    let keep = owned.split_off(split);
    RotationPlan { keep, remove: owned }
}

/// Deletes every entry in `plan.remove`. A failed deletion is recorded and
/// the remaining entries are still processed.
pub fn prune(plan: &RotationPlan) -> RotationReport {
    let mut report = RotationReport {
        kept: plan.keep.iter().map(|entry| entry.path.clone()).collect(),
        ..RotationReport::default()
    };

    for entry in &plan.remove {
        let result = if entry.is_directory {
            fs::remove_dir_all(&entry.path)
        } else {
            fs::remove_file(&entry.path)
        };

        match result {
            Ok(()) => report.removed.push(entry.path.clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report.removed.push(entry.path.clone())
            }
            Err(e) => report.failed.push((entry.path.clone(), e)),
        }
    }

    report
}

/// Scan, plan and prune in one go.
pub fn rotate(dir: &Path, identity: &Identity, keep: usize) -> Result<RotationReport> {
    let entries = scan(dir)?;
    Ok(prune(&plan(entries, identity, keep)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn entry(host: &str, minute: u64, version: &str) -> BackupEntry {
        BackupEntry {
            host: host.to_string(),
            timestamp: 197001010000 + minute,
            version: version.to_string(),
            path: PathBuf::from(format!("zabbix_cfg_{host}_19700101-00{minute:02}_{version}")),
            is_directory: true,
        }
    }

    fn names(dir: &Path) -> anyhow::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(dir)?
            .map(|item| item.map(|i| i.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        Ok(names)
    }

    fn fixture(names: &[(&str, bool)]) -> anyhow::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        for (name, is_dir) in names {
            let path = dir.path().join(name);
            if *is_dir {
                fs::create_dir(&path)?;
                File::create(path.join("zabbix_dump.pgdump"))?;
            } else {
                File::create(&path)?;
            }
        }
        Ok(dir)
    }

    #[test]
    fn test_parse_entry_from_path() {
        let path = Path::new("/backups/zabbix_cfg_db1_20240102-0304_6.4.10.tar.xz");
        let parsed = BackupEntry::parse(path, false).expect("valid backup name");

        assert_eq!(parsed.host, "db1");
        assert_eq!(parsed.version, "6.4.10");
        assert_eq!(parsed.timestamp, 202401020304);
        assert!(!parsed.is_directory);
        assert!(BackupEntry::parse(Path::new("/backups/notes.txt"), false).is_none());
    }

    #[test]
    fn test_plan_keeps_newest() {
        let entries = vec![
            entry("h", 3, "6.4.1"),
            entry("h", 1, "6.4.1"),
            entry("h", 4, "6.4.1"),
            entry("h", 2, "6.4.1"),
        ];
        let plan = plan(entries, &Identity::new("h", "6.4.1"), 1);

        let removed: Vec<u64> = plan.remove.iter().map(|e| e.timestamp % 100).collect();
        let kept: Vec<u64> = plan.keep.iter().map(|e| e.timestamp % 100).collect();
        assert_eq!(removed, vec![1, 2, 3]);
        assert_eq!(kept, vec![4]);
    }

    #[test]
    fn test_plan_zero_keeps_everything() {
        let entries: Vec<BackupEntry> = (0..50).map(|m| entry("h", m, "6.4.1")).collect();
        let plan = plan(entries, &Identity::new("h", "6.4.1"), 0);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.keep.len(), 50);
    }

    #[test]
    fn test_plan_ignores_other_identities() {
        let mut entries: Vec<BackupEntry> = (0..30).map(|m| entry("other", m, "6.4.1")).collect();
        entries.extend((0..30).map(|m| entry("h", m, "6.0.0")));
        entries.push(entry("h", 40, "6.4.1"));

        let plan = plan(entries, &Identity::new("h", "6.4.1"), 1);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.keep.len(), 1);
    }

    #[test]
    fn test_plan_fewer_than_retention() {
        let entries = vec![entry("h", 1, "7.0.0"), entry("h", 2, "7.0.0")];
        let plan = plan(entries, &Identity::new("h", "7.0.0"), 5);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.keep.len(), 2);
    }

    #[test]
    fn test_rotate_mixed_kinds_keep_one() -> anyhow::Result<()> {
        let dir = fixture(&[
            ("zabbix_cfg_127.0.0.1_19700101-0001_6.4.10", true),
            ("zabbix_cfg_127.0.0.1_19700101-0002_6.4.10.tar", false),
            ("zabbix_cfg_127.0.0.1_19700101-0003_6.4.10.tar.gz", false),
            ("zabbix_cfg_127.0.0.1_19700101-0004_6.4.10.tar.bz2", false),
            ("zabbix_cfg_127.0.0.2_19700101-0003_6.4.10.tar", false),
            ("zabbix_cfg_127.0.0.1_19700101-0001_6.0.0.tar.xz", false),
            ("unrelated.txt", false),
        ])?;

        let report = rotate(dir.path(), &Identity::new("127.0.0.1", "6.4.10"), 1)?;

        assert_eq!(report.removed.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(
            names(dir.path())?,
            vec![
                "unrelated.txt",
                "zabbix_cfg_127.0.0.1_19700101-0001_6.0.0.tar.xz",
                "zabbix_cfg_127.0.0.1_19700101-0004_6.4.10.tar.bz2",
                "zabbix_cfg_127.0.0.2_19700101-0003_6.4.10.tar",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rotate_keep_many() -> anyhow::Result<()> {
        let dir = fixture(&[
            ("zabbix_cfg_127.0.0.1_19700101-0001_6.4.10", true),
            ("zabbix_cfg_127.0.0.1_19700101-0002_6.4.10", true),
            ("zabbix_cfg_127.0.0.1_19700101-0003_6.4.10.tar", false),
            ("zabbix_cfg_127.0.0.1_19700101-0004_6.4.10.tar", false),
        ])?;

        rotate(dir.path(), &Identity::new("127.0.0.1", "6.4.10"), 3)?;

        assert_eq!(
            names(dir.path())?,
            vec![
                "zabbix_cfg_127.0.0.1_19700101-0002_6.4.10",
                "zabbix_cfg_127.0.0.1_19700101-0003_6.4.10.tar",
                "zabbix_cfg_127.0.0.1_19700101-0004_6.4.10.tar",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rotate_keep_everything() -> anyhow::Result<()> {
        let dir = fixture(&[
            ("zabbix_cfg_127.0.0.1_19700101-0001_6.4.10", true),
            ("zabbix_cfg_127.0.0.1_19700101-0002_6.4.10", true),
            ("zabbix_cfg_127.0.0.1_19700101-0003_6.4.10.tar", false),
        ])?;

        let report = rotate(dir.path(), &Identity::new("127.0.0.1", "6.4.10"), 0)?;

        assert!(report.removed.is_empty());
        assert_eq!(report.kept.len(), 3);
        assert_eq!(names(dir.path())?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_rotate_twice_is_idempotent() -> anyhow::Result<()> {
        let dir = fixture(&[
            ("zabbix_cfg_h_20240101-0000_7.0.0.tar.xz", false),
            ("zabbix_cfg_h_20240102-0000_7.0.0.tar.xz", false),
            ("zabbix_cfg_h_20240103-0000_7.0.0.tar.xz", false),
        ])?;
        let identity = Identity::new("h", "7.0.0");

        let first = rotate(dir.path(), &identity, 2)?;
        let second = rotate(dir.path(), &identity, 2)?;

        assert_eq!(first.removed.len(), 1);
        assert!(second.removed.is_empty());
        assert_eq!(second.kept.len(), 2);
        Ok(())
    }

    #[test]
    fn test_prune_already_deleted_entry() {
        let plan = RotationPlan {
            keep: Vec::new(),
            remove: vec![BackupEntry {
                path: PathBuf::from("/nonexistent/zabbix_cfg_h_20240101-0000_7.0.0"),
                ..entry("h", 0, "7.0.0")
            }],
        };

        let report = prune(&plan);
        assert_eq!(report.removed.len(), 1);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_scan_unreadable_directory() {
        let result = scan(Path::new("/nonexistent/backups/dir"));
        assert!(matches!(result, Err(BackupError::RotationScan { .. })));
    }
}
