use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid compression specification {input:?}: {reason}")]
    InvalidCompression { input: String, reason: String },

    #[error("Unknown tables found, aborting: {}", tables.join(", "))]
    PolicyViolation { tables: Vec<String> },

    #[error("No available strategy can produce {algorithm} ({mode})")]
    UnsupportedStrategy { algorithm: String, mode: String },

    #[error("Cannot scan backup directory {}: {source}", path.display())]
    RotationScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{program}` failed: {detail}")]
    Command { program: String, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackupError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BackupError::Config(_) | BackupError::InvalidCompression { .. } => 2,
            BackupError::PolicyViolation { .. } => 3,
            BackupError::UnsupportedStrategy { .. } => 4,
            BackupError::Command { .. } => 5,
            BackupError::Database(_) => 6,
            BackupError::RotationScan { .. } | BackupError::Io(_) => 1,
        }
    }
}

/// Exit code for an error chain coming out of the backup flow.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BackupError>())
        .map_or(1, BackupError::exit_code)
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_found_through_context() {
        let err: anyhow::Error = Err::<(), _>(BackupError::PolicyViolation {
            tables: vec!["foo".to_string()],
        })
        .context("Backup process failed")
        .unwrap_err();

        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_exit_code_defaults_to_generic_failure() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_policy_violation_lists_tables() {
        let err = BackupError::PolicyViolation {
            tables: vec!["extra_a".to_string(), "extra_b".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown tables found, aborting: extra_a, extra_b");
    }
}
