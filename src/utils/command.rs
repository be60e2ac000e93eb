// zabbixbackup/src/utils/command.rs
//! Blocking execution of external tools.
//!
//! A missing binary and a non-zero exit are reported the same way, as
//! [`BackupError::Command`].

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::debug;

use crate::errors::{BackupError, Result};

fn command_error(program: &str, detail: impl Into<String>) -> BackupError {
    BackupError::Command {
        program: program.to_string(),
        detail: detail.into(),
    }
}

fn build(argv: &[String], env: &BTreeMap<String, String>) -> Result<(String, Command)> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| command_error("<empty>", "no program given"))?;
    let mut command = Command::new(program);
    command.args(args).envs(env);
    Ok((program.clone(), command))
}

/// Shell-like rendering of a command for logs.
pub fn render(argv: &[String], env: &BTreeMap<String, String>) -> String {
    env.iter()
        .map(|(key, value)| format!("{key}={value:?}"))
        .chain(argv.iter().map(|arg| {
            let needs_quotes = arg.contains(|c: char| c.is_whitespace() || "|()'\"$".contains(c));
            if arg.is_empty() || needs_quotes {
                format!("'{}'", arg.replace('\'', "'\\''"))
            } else {
                arg.clone()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_status(program: &str, status: ExitStatus, stderr: &[u8]) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(stderr);
    Err(command_error(
        program,
        format!("exited with {status}\nStderr: {}", stderr.trim()),
    ))
}

/// Runs a command to completion.
pub fn run(argv: &[String], env: &BTreeMap<String, String>) -> Result<()> {
    let (program, mut command) = build(argv, env)?;
    debug!(command = %render(argv, env), "Running command");

    let output = command
        .output()
        .map_err(|e| command_error(&program, format!("failed to execute: {e}")))?;
    check_status(&program, output.status, &output.stderr)?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines().filter(|line| !line.trim().is_empty()) {
        debug!(program = %program, "{line}");
    }
    Ok(())
}

/// Spawns `argv` with its stdout captured, for the caller to consume.
pub fn spawn_producer(argv: &[String], env: &BTreeMap<String, String>) -> Result<(String, Child)> {
    let (program, mut command) = build(argv, env)?;
    debug!(command = %render(argv, env), "Spawning producer");
    let child = command
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| command_error(&program, format!("failed to execute: {e}")))?;
    Ok((program, child))
}

/// Waits for a child spawned by [`spawn_producer`].
pub fn wait_producer(program: &str, mut child: Child) -> Result<()> {
    let status = child
        .wait()
        .map_err(|e| command_error(program, format!("failed to wait: {e}")))?;
    check_status(program, status, &[])
}

/// `producer | consumer`, the consumer's stdout going to `stdout_to` when given.
pub fn run_pipeline(
    producer: &[String],
    producer_env: &BTreeMap<String, String>,
    consumer: &[String],
    consumer_env: &BTreeMap<String, String>,
    stdout_to: Option<&Path>,
) -> Result<()> {
    let (producer_program, mut producer_child) = spawn_producer(producer, producer_env)?;
    let producer_stdout = producer_child
        .stdout
        .take()
        .ok_or_else(|| command_error(&producer_program, "stdout not captured"))?;

    let (consumer_program, mut consumer_command) = build(consumer, consumer_env)?;
    debug!(command = %render(consumer, consumer_env), "Spawning consumer");
    consumer_command.stdin(Stdio::from(producer_stdout));
    if let Some(path) = stdout_to {
        let file = File::create(path).map_err(|e| {
            command_error(&consumer_program, format!("cannot create {}: {e}", path.display()))
        })?;
        consumer_command.stdout(Stdio::from(file));
    }

    let consumer_result = consumer_command
        .status()
        .map_err(|e| command_error(&consumer_program, format!("failed to execute: {e}")))
        .and_then(|status| check_status(&consumer_program, status, &[]));
    // The command still owns the read end of the pipe; the producer only
    // sees EPIPE once it is closed.
    drop(consumer_command);

    // Reap the producer even when the consumer failed.
    let producer_result = wait_producer(&producer_program, producer_child);
    producer_result.and(consumer_result)
}
