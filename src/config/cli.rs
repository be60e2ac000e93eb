// zabbixbackup/src/config/cli.rs
use clap::{ArgGroup, Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use crate::backup::classify::{MonitoringAction, UnknownAction};
use crate::compress::Strategy;

/// pg_dump output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    Plain,
    Custom,
    Directory,
    Tar,
}

impl DumpFormat {
    pub fn as_arg(self) -> &'static str {
        match self {
            DumpFormat::Plain => "plain",
            DumpFormat::Custom => "custom",
            DumpFormat::Directory => "directory",
            DumpFormat::Tar => "tar",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DumpFormat::Plain => ".sql",
            DumpFormat::Custom => ".pgdump",
            DumpFormat::Directory => "",
            DumpFormat::Tar => ".tar",
        }
    }
}

/// Backup of the Zabbix configuration stored in PostgreSQL.
#[derive(Parser, Debug, Clone)]
#[command(name = "zabbixbackup")]
#[command(group(ArgGroup::new("verbosity").args(["quiet", "verbose", "very_verbose", "debug"])))]
pub struct Cli {
    /// Read database host and credentials from the Zabbix server config.
    /// Implied by --zabbix-config.
    #[arg(short = 'z', long)]
    pub read_zabbix_config: bool,

    /// Zabbix server config path. Implies --read-zabbix-config.
    #[arg(short = 'Z', long, value_name = "PATH")]
    pub zabbix_config: Option<PathBuf>,

    /// Query the database and show the dump command without creating a backup.
    #[arg(short = 'D', long)]
    pub dry_run: bool,

    /// DBMS host, '-' for a blank value. A leading slash selects a socket directory.
    #[arg(short = 'H', long, help_heading = "Connection options")]
    pub host: Option<String>,

    /// DBMS port [default: 5432].
    #[arg(short = 'P', long, help_heading = "Connection options")]
    pub port: Option<String>,

    /// Socket directory, takes precedence over --host.
    #[arg(short = 'S', long, help_heading = "Connection options")]
    pub socket: Option<String>,

    /// Database login user [default: zabbix].
    #[arg(short = 'u', long, help_heading = "Connection options")]
    pub username: Option<String>,

    /// Database login password.
    #[arg(short = 'p', long, help_heading = "Connection options")]
    pub passwd: Option<String>,

    /// Database name [default: zabbix].
    #[arg(short = 'd', long, help_heading = "Connection options")]
    pub database: Option<String>,

    /// Database schema [default: public].
    #[arg(short = 's', long, help_heading = "Connection options")]
    pub schema: Option<String>,

    /// Existing pgpass-format file holding the credentials.
    #[arg(long, value_name = "PATH", help_heading = "Connection options")]
    pub login_file: Option<PathBuf>,

    /// Keep the generated login file inside the backup.
    #[arg(long, help_heading = "Connection options")]
    pub keep_login_file: bool,

    /// Action for tables that are not part of the Zabbix schema.
    #[arg(
        short = 'U',
        long,
        value_enum,
        default_value_t = UnknownAction::Ignore,
        help_heading = "Dump options"
    )]
    pub unknown_action: UnknownAction,

    /// Action for monitoring (history, trends, events...) tables.
    #[arg(
        short = 'M',
        long,
        value_enum,
        default_value_t = MonitoringAction::Nodata,
        help_heading = "Dump options"
    )]
    pub monitoring_action: MonitoringAction,

    /// Add column names in INSERT clauses and quote identifiers.
    #[arg(short = 'N', long, help_heading = "Dump options")]
    pub add_columns: bool,

    /// pg_dump output format.
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = DumpFormat::Custom,
        help_heading = "Dump options"
    )]
    pub format: DumpFormat,

    /// Passed as-is to pg_dump --compress.
    #[arg(short = 'x', long, help_heading = "Dump options")]
    pub compression: Option<String>,

    /// Stream the dump through an external compressor, e.g. xz:9e.
    #[arg(long, value_name = "ALGO[:LEVEL]", help_heading = "Dump options")]
    pub dump_compression: Option<String>,

    /// Save the files and folders listed in --files.
    #[arg(long, help_heading = "Configuration files")]
    pub save_files: bool,

    /// File listing paths to save, one per line.
    #[arg(long, value_name = "PATH", help_heading = "Configuration files")]
    pub files: Option<PathBuf>,

    /// Archive the backup: tar, gzip, xz or bzip2 with an optional ':LEVEL'.
    /// '-' leaves the backup as a directory.
    #[arg(
        short = 'a',
        long,
        default_value = "xz",
        value_name = "ALGO[:LEVEL]",
        help_heading = "Output options"
    )]
    pub archive: String,

    /// Compression strategies to try, in order [default: standard,fallback,builtin].
    #[arg(long, value_enum, value_delimiter = ',', help_heading = "Output options")]
    pub strategy: Vec<Strategy>,

    /// Directory receiving the backups.
    #[arg(short = 'o', long, default_value = ".", help_heading = "Output options")]
    pub outdir: PathBuf,

    /// Number of backups to keep for this host and version, 0 keeps everything.
    #[arg(short = 'r', long, default_value_t = 0, help_heading = "Output options")]
    pub rotate: usize,

    /// Only print unrecoverable errors.
    #[arg(short = 'q', long, help_heading = "Verbosity")]
    pub quiet: bool,

    /// Print progress information.
    #[arg(short = 'v', long, help_heading = "Verbosity")]
    pub verbose: bool,

    /// Print even more information.
    #[arg(short = 'V', long, help_heading = "Verbosity")]
    pub very_verbose: bool,

    /// Print everything.
    #[arg(long, help_heading = "Verbosity")]
    pub debug: bool,
}
