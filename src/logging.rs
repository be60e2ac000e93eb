// zabbixbackup/src/logging.rs
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Verbosity;

/// Log kept inside every backup, archived together with the dump.
pub const DUMP_LOG_FILE: &str = "dump.log";

fn console_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()))
}

fn console_layer<S>(verbosity: Verbosity) -> impl tracing_subscriber::Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter(verbosity))
}

/// Installs the process-wide subscriber writing to stderr.
pub fn init(verbosity: Verbosity) {
    tracing_subscriber::registry().with(console_layer(verbosity)).init();
}

/// Subscriber for the dump phase: the console output plus everything down
/// to debug level in `<backup_dir>/dump.log`.
pub fn dump_log_subscriber(
    backup_dir: &Path,
    verbosity: Verbosity,
) -> Result<impl Subscriber + Send + Sync + use<>> {
    let path = backup_dir.join(DUMP_LOG_FILE);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::DEBUG);

    Ok(tracing_subscriber::registry()
        .with(console_layer(verbosity))
        .with(file_layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_log_records_debug_events() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let subscriber = dump_log_subscriber(dir.path(), Verbosity::Quiet)?;

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(table_count = 3, "Dumping database");
            tracing::debug!("pg_dump: reading schemas");
            tracing::trace!("not kept");
        });

        let log = std::fs::read_to_string(dir.path().join(DUMP_LOG_FILE))?;
        assert!(log.contains("Dumping database"));
        assert!(log.contains("table_count=3"));
        assert!(log.contains("pg_dump: reading schemas"));
        assert!(!log.contains("not kept"));
        Ok(())
    }

    #[test]
    fn test_dump_log_needs_existing_directory() {
        let missing = Path::new("/nonexistent/backup/dir");
        assert!(dump_log_subscriber(missing, Verbosity::Normal).is_err());
    }
}
