// zabbixbackup/src/utils/pgpass.rs
//! Minimal support for PostgreSQL password files (`hostname:port:database:username:password`).

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Escapes `:` and `\` as pgpass requires.
fn escape(field: &str) -> String {
    field.replace('\\', "\\\\").replace(':', "\\:")
}

/// Formats a single pgpass line.
pub fn entry_line(host: &str, port: u16, database: &str, user: &str, password: &str) -> String {
    format!(
        "{}:{}:{}:{}:{}\n",
        escape(host),
        port,
        escape(database),
        escape(user),
        escape(password)
    )
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.extend(chars.next()),
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

/// Looks up the password for a connection, first matching line wins.
pub fn lookup(contents: &str, host: &str, port: u16, database: &str, user: &str) -> Option<String> {
    let port = port.to_string();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(split_fields)
        .filter(|fields| fields.len() == 5)
        .find(|fields| {
            matches(&fields[0], host)
                && matches(&fields[1], &port)
                && matches(&fields[2], database)
                && matches(&fields[3], user)
        })
        .map(|mut fields| fields.swap_remove(4))
}

pub fn lookup_file(
    path: &Path,
    host: &str,
    port: u16,
    database: &str,
    user: &str,
) -> Result<Option<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read login file {}", path.display()))?;
    Ok(lookup(&contents, host, port, database, user))
}

/// Writes a single-entry password file readable by the owner only. The
/// file never exists with wider permissions, not even briefly.
pub fn write_file(path: &Path, line: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to create login file {}", path.display()))?;

    // `mode` only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions of {}", path.display()))?;
    }

    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed to write login file {}", path.display()))?;
    Ok(())
}
