// zabbixbackup/src/config/mod.rs
pub mod cli;
pub mod layers;
pub mod zabbix_conf;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backup::classify::{MonitoringAction, UnknownAction};
use crate::compress::{
    parse_archive_option, parse_profile, CompressionProfile, Strategy, DEFAULT_STRATEGIES,
};
use crate::errors::BackupError;
pub use cli::{Cli, DumpFormat};
use layers::{ConfigChain, MapLayer};
use zabbix_conf::{ZabbixConfig, DEFAULT_ZABBIX_CONFIG};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "5432";
const DEFAULT_USER: &str = "zabbix";
const DEFAULT_DBNAME: &str = "zabbix";
const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.quiet {
            Verbosity::Quiet
        } else if cli.debug {
            Verbosity::Debug
        } else if cli.very_verbose {
            Verbosity::VeryVerbose
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// `tracing` filter directive for this level.
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
            Verbosity::Debug => "trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Hostname, IP, socket directory or empty for the client default.
    pub host: String,
    pub port: u16,
    pub user: String,
    pub passwd: Option<String>,
    pub dbname: String,
    pub schema: String,
    pub login_file: Option<PathBuf>,
    pub keep_login_file: bool,
}

#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub connection: ConnectionConfig,
    pub dry_run: bool,
    pub monitoring_action: MonitoringAction,
    pub unknown_action: UnknownAction,
    pub add_columns: bool,
    pub format: DumpFormat,
    /// Passed verbatim to `pg_dump --compress`.
    pub pg_compression: Option<String>,
    pub dump_compression: Option<CompressionProfile>,
    pub archive: Option<CompressionProfile>,
    pub strategies: Vec<Strategy>,
    pub outdir: PathBuf,
    pub rotate: usize,
    pub save_files: bool,
    pub files: Option<PathBuf>,
    pub verbosity: Verbosity,
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    BackupError::Config(message.into()).into()
}

/// Values the user typed on the command line, keyed like the other layers.
fn cli_layer(cli: &Cli) -> MapLayer {
    let blank = |value: &Option<String>| {
        value
            .as_ref()
            .map(|v| if v == "-" { String::new() } else { v.clone() })
    };

    let mut layer = MapLayer::new("command line");
    layer.set_opt("host", blank(&cli.host));
    layer.set_opt("sock", blank(&cli.socket));
    layer.set_opt("port", cli.port.clone());
    layer.set_opt("user", cli.username.clone());
    layer.set_opt("passwd", cli.passwd.clone());
    layer.set_opt("dbname", cli.database.clone());
    layer.set_opt("schema", cli.schema.clone());
    layer
}

fn defaults_layer() -> MapLayer {
    MapLayer::new("defaults")
        .with("host", DEFAULT_HOST)
        .with("port", DEFAULT_PORT)
        .with("user", DEFAULT_USER)
        .with("dbname", DEFAULT_DBNAME)
        .with("schema", DEFAULT_SCHEMA)
}

/// Builds the precedence chain: command line, Zabbix config values, Zabbix
/// config documented defaults, built-in defaults.
pub fn build_chain(cli: &Cli) -> Result<ConfigChain> {
    let mut chain = ConfigChain::new();
    chain.push(cli_layer(cli));

    if cli.read_zabbix_config || cli.zabbix_config.is_some() {
        let path = cli
            .zabbix_config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ZABBIX_CONFIG));
        let (values, defaults) = ZabbixConfig::read(&path)?.layers();
        debug!(
            path = %path.display(),
            values = values.len(),
            defaults = defaults.len(),
            "Read Zabbix config"
        );
        chain.push(values);
        chain.push(defaults);
    }

    chain.push(defaults_layer());
    debug!(layers = ?chain.layer_names(), "Configuration sources");
    Ok(chain)
}

fn resolve_required(chain: &ConfigChain, key: &str) -> Result<String> {
    let resolved = chain
        .resolve(key)
        .ok_or_else(|| config_error(format!("no value for '{key}'")))?;
    debug!(key, source = %resolved.source, "Resolved configuration value");
    Ok(resolved.value)
}

/// Host or socket directory. A socket only replaces a host that came from
/// the same or a lower priority source, so `-H` beats a `DBSocket` read
/// from the Zabbix config.
fn resolve_host(chain: &ConfigChain) -> Result<String> {
    let host = chain
        .resolve("host")
        .ok_or_else(|| config_error("no value for 'host'"))?;

    match chain.resolve("sock") {
        Some(sock) if !sock.value.is_empty() && sock.rank <= host.rank => {
            debug!(
                socket = %sock.value,
                source = %sock.source,
                "Socket takes precedence over host"
            );
            Ok(sock.value)
        }
        _ => {
            debug!(key = "host", source = %host.source, "Resolved configuration value");
            Ok(host.value)
        }
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    let port: u16 = raw
        .parse()
        .map_err(|_| config_error(format!("Port must be integer: {raw:?}")))?;
    if port < 1024 {
        return Err(config_error(format!("Port must be between 1024 and 65535: {port}")));
    }
    Ok(port)
}

/// The output directory must exist as a directory or be creatable.
fn check_outdir(outdir: &Path) -> Result<()> {
    let parent_is_file = outdir
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .is_some_and(|parent| parent.exists() && !parent.is_dir());

    if (outdir.exists() && !outdir.is_dir()) || parent_is_file {
        return Err(config_error(format!(
            "Output directory: cannot create or use {}",
            outdir.display()
        )));
    }
    Ok(())
}

impl BackupConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let chain = build_chain(cli)?;

        let host = resolve_host(&chain)?;

        let connection = ConnectionConfig {
            host,
            port: parse_port(&resolve_required(&chain, "port")?)?,
            user: resolve_required(&chain, "user")?,
            passwd: chain.resolve("passwd").map(|r| r.value),
            dbname: resolve_required(&chain, "dbname")?,
            schema: resolve_required(&chain, "schema")?,
            login_file: cli.login_file.clone(),
            keep_login_file: cli.keep_login_file,
        };

        let dump_compression = cli
            .dump_compression
            .as_deref()
            .map(parse_profile)
            .transpose()
            .context("Invalid --dump-compression")?;
        if dump_compression.is_some() && cli.format == DumpFormat::Directory {
            return Err(config_error("--dump-compression cannot be used with the directory format"));
        }

        let archive = parse_archive_option(&cli.archive).context("Invalid --archive")?;

        check_outdir(&cli.outdir)?;

        let strategies = if cli.strategy.is_empty() {
            DEFAULT_STRATEGIES.to_vec()
        } else {
            cli.strategy.clone()
        };

        Ok(BackupConfig {
            connection,
            dry_run: cli.dry_run,
            monitoring_action: cli.monitoring_action,
            unknown_action: cli.unknown_action,
            add_columns: cli.add_columns,
            format: cli.format,
            pg_compression: cli.compression.clone(),
            dump_compression,
            archive,
            strategies,
            outdir: cli.outdir.clone(),
            rotate: cli.rotate,
            save_files: cli.save_files,
            files: cli.files.clone(),
            verbosity: Verbosity::from_cli(cli),
        })
    }
}
