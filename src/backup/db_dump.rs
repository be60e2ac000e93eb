// zabbixbackup/src/backup/db_dump.rs
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{Connection, PgConnection, Row};
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::compress::{CommandDescriptor, Sink};
use crate::config::{BackupConfig, ConnectionConfig, DumpFormat, Verbosity};
use crate::errors::BackupError;
use crate::utils::{command, find_executable, pgpass};

const DUMP_BASENAME: &str = "zabbix_dump";

/// What the backup needs to know about the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub version: String,
    pub tables: Vec<String>,
}

/// Zabbix stores its version as `MMmmrrrr`, e.g. `6040025` for 6.4.25.
pub fn parse_zabbix_version(raw: i64) -> Result<String> {
    if raw < 1_000_000 {
        anyhow::bail!("Unexpected Zabbix database version: {raw}");
    }
    let major = raw / 1_000_000;
    let minor = (raw / 10_000) % 100;
    let patch = raw % 10_000;
    Ok(format!("{major}.{minor}.{patch}"))
}

/// Host as written in pgpass files: sockets and the client default match
/// `localhost`.
fn pgpass_host(host: &str) -> &str {
    if host.is_empty() || host.starts_with('/') {
        "localhost"
    } else {
        host
    }
}

fn resolve_password(connection: &ConnectionConfig) -> Result<Option<String>> {
    if let Some(passwd) = &connection.passwd {
        return Ok(Some(passwd.clone()));
    }
    match &connection.login_file {
        Some(path) => pgpass::lookup_file(
            path,
            pgpass_host(&connection.host),
            connection.port,
            &connection.dbname,
            &connection.user,
        ),
        None => Ok(None),
    }
}

pub fn connect_options(connection: &ConnectionConfig) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::new()
        .port(connection.port)
        .username(&connection.user)
        .database(&connection.dbname);

    if connection.host.starts_with('/') {
        options = options.socket(&connection.host);
    } else if !connection.host.is_empty() {
        options = options.host(&connection.host);
    }

    if let Some(password) = resolve_password(connection)? {
        options = options.password(&password);
    }
    Ok(options)
}

fn version_from_row(row: &PgRow) -> std::result::Result<i64, sqlx::Error> {
    row.try_get::<i32, _>(0)
        .map(i64::from)
        .or_else(|_| row.try_get::<i64, _>(0))
}

/// Reads the Zabbix version and the base tables of the configured schema.
pub async fn inspect(connection: &ConnectionConfig) -> Result<DatabaseInfo> {
    let options = connect_options(connection)?;
    info!(
        host = %connection.host,
        port = connection.port,
        database = %connection.dbname,
        "Connecting to database"
    );
    let mut conn = PgConnection::connect_with(&options)
        .await
        .map_err(BackupError::from)
        .with_context(|| format!("Failed to connect to database '{}'", connection.dbname))?;

    let row = sqlx::query("SELECT optional FROM dbversion")
        .fetch_one(&mut conn)
        .await
        .map_err(BackupError::from)
        .context("Failed to read the Zabbix database version")?;
    let raw = version_from_row(&row)
        .map_err(BackupError::from)
        .context("Unexpected type for dbversion.optional")?;
    let version = parse_zabbix_version(raw)?;
    debug!(raw, %version, "Zabbix database version");

    let rows = sqlx::query(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = $1 AND table_catalog = $2 AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .bind(&connection.schema)
    .bind(&connection.dbname)
    .fetch_all(&mut conn)
    .await
    .map_err(BackupError::from)
    .context("Failed to list database tables")?;

    let tables = rows
        .iter()
        .map(|row| row.try_get::<String, _>(0))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(BackupError::from)?;
    debug!(count = tables.len(), schema = %connection.schema, "Discovered tables");

    conn.close().await.map_err(BackupError::from)?;
    Ok(DatabaseInfo { version, tables })
}

/// Extension `pg_dump --compress` adds to a plain dump. A best guess, the
/// value is passed through to pg_dump unchecked.
pub fn pg_compression_extension(format: DumpFormat, compression: Option<&str>) -> &'static str {
    let Some(compression) = compression else {
        return "";
    };
    if format != DumpFormat::Plain {
        return "";
    }
    let (algorithm, detail) = compression.split_once(':').unwrap_or((compression, ""));
    if algorithm == "0" || detail == "0" {
        ""
    } else if algorithm == "gzip"
        || (!algorithm.is_empty() && algorithm.chars().all(|c| c.is_ascii_digit()))
    {
        ".gz"
    } else if algorithm == "lz4" {
        ".lz"
    } else if algorithm == "zstd" {
        ".zst"
    } else {
        ""
    }
}

/// A fully specified dump, ready to execute.
#[derive(Debug, Clone)]
pub struct DumpCommand {
    pub argv: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub output: PathBuf,
    /// Streams pg_dump's stdout through this compressor instead of `--file`.
    pub compressor: Option<CommandDescriptor>,
}

fn is_passthrough(descriptor: &CommandDescriptor) -> bool {
    matches!(descriptor, CommandDescriptor::Compressor { pipe_argv, .. } if pipe_argv.is_empty())
}

/// Builds the pg_dump invocation writing into `backup_dir`.
pub fn dump_command(
    config: &BackupConfig,
    params: &[String],
    backup_dir: &Path,
    login_file: Option<&Path>,
    compressor: Option<&CommandDescriptor>,
) -> DumpCommand {
    let connection = &config.connection;
    let compressor = compressor.filter(|d| !is_passthrough(d)).cloned();

    let mut argv = vec!["pg_dump".to_string()];
    if !connection.host.is_empty() {
        argv.extend(["--host".to_string(), connection.host.clone()]);
    }
    argv.extend([
        "--username".to_string(),
        connection.user.clone(),
        "--port".to_string(),
        connection.port.to_string(),
        "--dbname".to_string(),
        connection.dbname.clone(),
        "--schema".to_string(),
        connection.schema.clone(),
        "--no-password".to_string(),
    ]);
    if config.add_columns {
        argv.extend(
            ["--inserts", "--column-inserts", "--quote-all-identifiers"].map(String::from),
        );
    }
    argv.extend(["--format".to_string(), config.format.as_arg().to_string()]);
    if let Some(compression) = &config.pg_compression {
        argv.extend(["--compress".to_string(), compression.clone()]);
    }

    let compression_extension = match &compressor {
        Some(descriptor) => descriptor.extension().to_string(),
        None => {
            pg_compression_extension(config.format, config.pg_compression.as_deref()).to_string()
        }
    };
    let output = backup_dir.join(format!(
        "{DUMP_BASENAME}{}{compression_extension}",
        config.format.extension()
    ));

    if compressor.is_none() {
        argv.extend(["--file".to_string(), output.to_string_lossy().into_owned()]);
    }
    if config.verbosity >= Verbosity::VeryVerbose {
        argv.push("--verbose".to_string());
    }
    argv.extend(params.iter().cloned());

    let env = login_file
        .map(|path| {
            BTreeMap::from([("PGPASSFILE".to_string(), path.to_string_lossy().into_owned())])
        })
        .unwrap_or_default();

    DumpCommand {
        argv,
        env,
        output,
        compressor,
    }
}

/// Runs the dump and returns the path of the dump file or directory.
pub fn execute(dump: &DumpCommand) -> Result<PathBuf> {
    let pg_dump_path = find_executable("pg_dump").map_err(|e| BackupError::Command {
        program: "pg_dump".to_string(),
        detail: e.to_string(),
    })?;
    debug!(path = %pg_dump_path.display(), "Found pg_dump executable");
    info!(output = %dump.output.display(), "Dumping database");

    match &dump.compressor {
        None => command::run(&dump.argv, &dump.env)?,
        Some(CommandDescriptor::Compressor {
            env,
            pipe_argv,
            sink,
            ..
        }) => match sink {
            Sink::Stdout => {
                command::run_pipeline(&dump.argv, &dump.env, pipe_argv, env, Some(&dump.output))?
            }
            Sink::PathArgument => {
                let mut consumer = pipe_argv.clone();
                consumer.push(dump.output.to_string_lossy().into_owned());
                command::run_pipeline(&dump.argv, &dump.env, &consumer, env, None)?
            }
        },
        Some(CommandDescriptor::Builtin { level, .. }) => {
            gzip_stream(&dump.argv, &dump.env, &dump.output, level.unwrap_or(6))?
        }
        Some(other) => anyhow::bail!("Cannot stream a dump through {other:?}"),
    }

    debug!(output = %dump.output.display(), "✓ Dump complete");
    Ok(dump.output.clone())
}

fn gzip_stream(
    argv: &[String],
    env: &BTreeMap<String, String>,
    output: &Path,
    level: u32,
) -> Result<()> {
    let (program, mut child) = command::spawn_producer(argv, env)?;
    let mut stdout = child.stdout.take().ok_or_else(|| BackupError::Command {
        program: program.clone(),
        detail: "stdout not captured".to_string(),
    })?;

    let file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::new(level));
    let copied = io::copy(&mut stdout, &mut encoder)
        .and_then(|_| encoder.finish().map(|_| ()))
        .with_context(|| format!("Failed to compress dump into {}", output.display()));
    drop(stdout);

    command::wait_producer(&program, child)?;
    copied
}
