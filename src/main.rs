//! Zabbix configuration backup tool
//!
//! Dumps the configuration part of a Zabbix PostgreSQL database, archives it
//! and rotates previous backups.

// zabbixbackup/src/main.rs
mod backup;
mod catalog;
mod compress;
mod config;
mod errors;
mod logging;
mod rotation;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use config::{BackupConfig, Cli, Verbosity};
use errors::exit_code_for;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(Verbosity::from_cli(&cli));

    match run_app(&cli).await {
        Ok(Some(path)) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run_app(cli: &Cli) -> Result<Option<std::path::PathBuf>> {
    let backup_config = BackupConfig::from_cli(cli).context("Invalid configuration")?;
    tracing::debug!(
        host = %backup_config.connection.host,
        database = %backup_config.connection.dbname,
        outdir = %backup_config.outdir.display(),
        "Configuration resolved"
    );
    backup::run_backup_flow(&backup_config)
        .await
        .context("Backup process failed")
}
