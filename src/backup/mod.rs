// zabbixbackup/src/backup/mod.rs
pub mod archive;
pub mod classify;
pub mod db_dump;
pub mod dump_params;
pub mod manifest;
pub mod naming;
pub mod save_files;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::TableCatalog;
use crate::compress::{resolve, CommandDescriptor, Mode};
use crate::config::BackupConfig;
use crate::errors::BackupError;
use crate::logging;
use crate::rotation::{self, Identity, RotationPlan};
use crate::utils::{binary_available, command, pgpass};
use classify::{
    apply_policy, classify, Classification, FilterLists, MonitoringAction, UnknownAction,
};
use db_dump::DumpCommand;
use manifest::BackupManifest;

const GENERATED_LOGIN_FILE: &str = ".pgpass";

/// Classification, filter lists and pg_dump filter arguments for a set of
/// discovered tables.
#[derive(Debug, Clone)]
pub struct DumpPlan {
    pub classification: Classification,
    pub filters: FilterLists,
    pub params: Vec<String>,
}

/// Classifies `tables` and derives the dump filters. Fails when the policy
/// marks any table as fatal.
pub fn plan_dump<S: AsRef<str>>(
    tables: &[S],
    catalog: &TableCatalog,
    monitoring: MonitoringAction,
    unknown: UnknownAction,
) -> crate::errors::Result<DumpPlan> {
    let classification = classify(tables.iter(), catalog);
    let filters = apply_policy(&classification, monitoring, unknown);

    if !filters.fail.is_empty() {
        return Err(BackupError::PolicyViolation {
            tables: filters.fail.clone(),
        });
    }

    let params = dump_params::build_dump_params(
        &filters.nodata,
        &filters.ignore,
        dump_params::DEFAULT_BATCH_SIZE,
    );
    Ok(DumpPlan {
        classification,
        filters,
        params,
    })
}

/// Password file handed to pg_dump.
struct LoginFile {
    path: PathBuf,
    generated: bool,
}

fn prepare_login_file(config: &BackupConfig, backup_dir: &Path) -> Result<Option<LoginFile>> {
    let connection = &config.connection;
    if let Some(passwd) = &connection.passwd {
        let path = backup_dir.join(GENERATED_LOGIN_FILE);
        let line = pgpass::entry_line(
            if connection.host.is_empty() || connection.host.starts_with('/') {
                "localhost"
            } else {
                &connection.host
            },
            connection.port,
            &connection.dbname,
            &connection.user,
            passwd,
        );
        pgpass::write_file(&path, &line)?;
        debug!(path = %path.display(), "Wrote login file");
        return Ok(Some(LoginFile { path, generated: true }));
    }

    Ok(connection.login_file.as_ref().map(|path| LoginFile {
        path: path.clone(),
        generated: false,
    }))
}

fn cleanup_login_file(config: &BackupConfig, login_file: Option<&LoginFile>) {
    let Some(login_file) = login_file.filter(|f| f.generated) else {
        return;
    };
    if config.connection.keep_login_file {
        info!(path = %login_file.path.display(), "Keeping login file");
        return;
    }
    if let Err(e) = fs::remove_file(&login_file.path) {
        warn!(path = %login_file.path.display(), error = %e, "Failed to remove login file");
    }
}

/// Creates `<outdir>/<name>`. A directory or archive left by an earlier run
/// with the same name is never reused.
fn create_backup_dir(outdir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let archive_prefix = format!("{name}.");
    let items =
        fs::read_dir(outdir).with_context(|| format!("Failed to list {}", outdir.display()))?;
    for item in items {
        let file_name = item?.file_name();
        if file_name.to_string_lossy().starts_with(&archive_prefix) {
            anyhow::bail!(
                "Backup {} already exists in {}",
                file_name.to_string_lossy(),
                outdir.display()
            );
        }
    }

    let backup_dir = outdir.join(name);
    match fs::create_dir(&backup_dir) {
        Ok(()) => Ok(backup_dir),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            anyhow::bail!("Backup directory already exists: {}", backup_dir.display())
        }
        Err(e) => Err(e).with_context(|| {
            format!("Failed to create backup directory: {}", backup_dir.display())
        }),
    }
}

/// Rotation plan for a dry run, `None` when the output directory cannot be
/// scanned.
fn dry_run_rotation_plan(outdir: &Path, identity: &Identity, keep: usize) -> Option<RotationPlan> {
    match rotation::scan(outdir) {
        Ok(entries) => Some(rotation::plan(entries, identity, keep)),
        Err(e) => {
            warn!(error = %e, "Rotation plan unavailable");
            None
        }
    }
}

fn log_rotation_plan(plan: &RotationPlan) {
    for entry in &plan.keep {
        info!(path = %entry.path.display(), "Rotation keeps");
    }
    for entry in &plan.remove {
        info!(path = %entry.path.display(), "Rotation would remove");
    }
}

/// Applies retention after a successful backup. Failures here never fail
/// the backup itself.
fn rotate_backups(config: &BackupConfig, identity: &Identity) {
    if config.rotate == 0 {
        debug!("Rotation disabled, keeping every backup");
        return;
    }

    match rotation::rotate(&config.outdir, identity, config.rotate) {
        Ok(report) => {
            debug!(kept = report.kept.len(), "Rotation done");
            for path in &report.removed {
                info!(path = %path.display(), "Removed old backup");
            }
            for (path, e) in &report.failed {
                warn!(path = %path.display(), error = %e, "Failed to remove old backup");
            }
        }
        Err(e) => warn!(error = %e, "Rotation skipped"),
    }
}

fn dry_run(config: &BackupConfig, dump: &DumpCommand, identity: &Identity) -> Option<PathBuf> {
    println!("{}", command::render(&dump.argv, &dump.env));
    if let Some(CommandDescriptor::Compressor { pipe_argv, env, .. }) = &dump.compressor {
        println!("| {}", command::render(pipe_argv, env));
    }

    if config.rotate > 0 && config.outdir.is_dir() {
        if let Some(plan) = dry_run_rotation_plan(&config.outdir, identity, config.rotate) {
            log_rotation_plan(&plan);
        }
    }
    info!("Dry run, nothing written");
    None
}

/// Dump, manifest and saved files, everything that lands inside the backup
/// directory.
fn fill_backup_dir(
    config: &BackupConfig,
    manifest: &mut BackupManifest,
    dump: &DumpCommand,
    backup_dir: &Path,
) -> Result<()> {
    let dump_path = db_dump::execute(dump)?;
    manifest.dump_file = dump_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    if config.save_files {
        let paths = save_files::read_file_list(config.files.as_deref())?;
        manifest.saved_files = save_files::save_files(backup_dir, &paths)?;
    }

    manifest.write(backup_dir)?;
    Ok(())
}

/// Runs a complete backup. Returns the final archive or directory, `None`
/// on a dry run.
pub async fn run_backup_flow(config: &BackupConfig) -> Result<Option<PathBuf>> {
    let db = db_dump::inspect(&config.connection).await?;
    info!(version = %db.version, tables = db.tables.len(), "Inspected Zabbix database");

    let catalog = TableCatalog::zabbix();
    let dump_plan = plan_dump(
        &db.tables,
        &catalog,
        config.monitoring_action,
        config.unknown_action,
    )?;
    info!(
        config = dump_plan.classification.config.len(),
        monitoring = dump_plan.classification.monitoring.len(),
        unknown = dump_plan.classification.unknown.len(),
        "Classified tables"
    );
    if !dump_plan.classification.unknown.is_empty() {
        warn!(
            action = ?config.unknown_action,
            "Unknown tables: {}",
            dump_plan.classification.unknown.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    debug!(ignore = ?dump_plan.filters.ignore, nodata = ?dump_plan.filters.nodata, "Filter lists");

    let dump_compressor = config
        .dump_compression
        .as_ref()
        .map(|profile| resolve(profile, Mode::Standalone, &config.strategies, binary_available))
        .transpose()?;

    let now = Local::now().naive_local();
    let name = naming::backup_name(&config.connection.host, now, &db.version);
    let backup_dir = config.outdir.join(&name);
    let identity = Identity::new(
        naming::identity_host(&config.connection.host),
        db.version.clone(),
    );

    if config.dry_run {
        let login_file = config
            .connection
            .passwd
            .as_ref()
            .map(|_| backup_dir.join(GENERATED_LOGIN_FILE))
            .or_else(|| config.connection.login_file.clone());
        let dump = db_dump::dump_command(
            config,
            &dump_plan.params,
            &backup_dir,
            login_file.as_deref(),
            dump_compressor.as_ref(),
        );
        return Ok(dry_run(config, &dump, &identity));
    }

    let backup_dir = create_backup_dir(&config.outdir, &name)?;
    info!(path = %backup_dir.display(), "Backup directory created");

    let login_file = prepare_login_file(config, &backup_dir)?;
    let dump = db_dump::dump_command(
        config,
        &dump_plan.params,
        &backup_dir,
        login_file.as_ref().map(|f| f.path.as_path()),
        dump_compressor.as_ref(),
    );

    let mut manifest = BackupManifest {
        name: name.clone(),
        host: config.connection.host.clone(),
        version: db.version.clone(),
        timestamp: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        format: config.format,
        filters: dump_plan.filters.clone(),
        dump_args: dump.argv.clone(),
        dump_file: String::new(),
        saved_files: Vec::new(),
        tool_version: env!("CARGO_PKG_VERSION"),
    };

    let filled = logging::dump_log_subscriber(&backup_dir, config.verbosity).and_then(|subscriber| {
        tracing::subscriber::with_default(subscriber, || {
            fill_backup_dir(config, &mut manifest, &dump, &backup_dir)
        })
    });
    cleanup_login_file(config, login_file.as_ref());
    filled?;

    let final_path = match &config.archive {
        Some(profile) => {
            let descriptor =
                resolve(profile, Mode::TarIntegrated, &config.strategies, binary_available)?;
            debug!(?descriptor, "Archive command");
            let archive_path = archive::archive_directory(&backup_dir, &descriptor)?;
            fs::remove_dir_all(&backup_dir).with_context(|| {
                format!("Failed to remove {} after archiving", backup_dir.display())
            })?;
            archive_path
        }
        None => backup_dir,
    };
    info!(path = %final_path.display(), "Backup complete");

    rotate_backups(config, &identity);
    Ok(Some(final_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::errors::exit_code_for;

    fn catalog() -> TableCatalog {
        TableCatalog::new(&[
            CatalogEntry {
                name: "hosts",
                first_version: "1.0",
                last_version: "7.0",
                is_data: false,
            },
            CatalogEntry {
                name: "history",
                first_version: "1.0",
                last_version: "7.0",
                is_data: true,
            },
            CatalogEntry {
                name: "trends",
                first_version: "1.0",
                last_version: "7.0",
                is_data: true,
            },
        ])
    }

    #[test]
    fn test_plan_dump_default_policy() -> anyhow::Result<()> {
        let plan = plan_dump(
            &["hosts", "history", "trends", "my_report"],
            &catalog(),
            MonitoringAction::Nodata,
            UnknownAction::Ignore,
        )?;

        assert_eq!(plan.filters.nodata, vec!["history", "trends"]);
        assert_eq!(plan.filters.ignore, vec!["my_report"]);
        assert_eq!(
            plan.params,
            vec!["--exclude-table-data", "(history|trends)", "--exclude-table", "(my_report)"]
        );
        Ok(())
    }

    #[test]
    fn test_plan_dump_fail_policy() {
        let err = plan_dump(
            &["hosts", "zz_extra", "aa_extra"],
            &catalog(),
            MonitoringAction::Dump,
            UnknownAction::Fail,
        )
        .expect_err("unknown tables must abort");

        match &err {
            BackupError::PolicyViolation { tables } => {
                assert_eq!(tables, &vec!["aa_extra", "zz_extra"])
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(exit_code_for(&anyhow::Error::from(err)), 3);
    }

    #[test]
    fn test_plan_dump_everything_dumped() -> anyhow::Result<()> {
        let plan = plan_dump(
            &["hosts", "history"],
            &catalog(),
            MonitoringAction::Dump,
            UnknownAction::Dump,
        )?;
        assert!(plan.params.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_backup_dir_refuses_existing_directory() -> anyhow::Result<()> {
        let outdir = tempfile::tempdir()?;
        let name = "zabbix_cfg_db_20240101-0000_7.0.0";

        let created = create_backup_dir(outdir.path(), name)?;
        fs::write(created.join("zabbix_dump.pgdump"), b"first run")?;

        assert!(create_backup_dir(outdir.path(), name).is_err());
        assert_eq!(fs::read(created.join("zabbix_dump.pgdump"))?, b"first run");
        Ok(())
    }

    #[test]
    fn test_create_backup_dir_refuses_existing_archive() -> anyhow::Result<()> {
        let outdir = tempfile::tempdir()?;
        let name = "zabbix_cfg_db_20240101-0000_7.0.0";
        fs::write(outdir.path().join(format!("{name}.tar.xz")), b"archive")?;

        assert!(create_backup_dir(outdir.path(), name).is_err());
        assert!(!outdir.path().join(name).exists());
        Ok(())
    }

    #[test]
    fn test_create_backup_dir_creates_missing_outdir() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let outdir = root.path().join("nested/backups");

        let created = create_backup_dir(&outdir, "zabbix_cfg_db_20240101-0000_7.0.0")?;
        assert!(created.is_dir());
        Ok(())
    }

    #[test]
    fn test_dry_run_rotation_plan_tolerates_scan_failure() {
        let identity = Identity::new("db", "7.0.0");
        assert!(dry_run_rotation_plan(Path::new("/nonexistent/backups"), &identity, 2).is_none());
    }
}
