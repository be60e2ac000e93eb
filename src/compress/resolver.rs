use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::{Algorithm, CompressionProfile};
use crate::errors::{BackupError, Result};

/// Generic multi-format archiver used when a native compressor is missing.
const FALLBACK_ARCHIVER: &str = "7z";
const TAR: &str = "tar";

/// One way of realising a compression profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Native compressor binaries (`gzip`, `xz`, `bzip2`) and `tar`.
    Standard,
    /// `7z` standing in for a missing native compressor.
    Fallback,
    /// In-process tar/gzip, no external binary involved.
    Builtin,
}

pub const DEFAULT_STRATEGIES: &[Strategy] =
    &[Strategy::Standard, Strategy::Fallback, Strategy::Builtin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compress a single file or stream.
    Standalone,
    /// Produce a compressed tarball of a directory.
    TarIntegrated,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Standalone => f.write_str("standalone"),
            Mode::TarIntegrated => f.write_str("tar-integrated"),
        }
    }
}

/// Where a compressor command writes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Filter style: compressed stream on stdout, or in place next to a named file.
    Stdout,
    /// The destination path must be passed as an extra argument.
    PathArgument,
}

/// Concrete, side-effect free description of how to compress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDescriptor {
    Compressor {
        env: BTreeMap<String, String>,
        extension: String,
        standalone_argv: Vec<String>,
        /// Same command reading the payload from stdin.
        pipe_argv: Vec<String>,
        sink: Sink,
    },
    Tar {
        env: BTreeMap<String, String>,
        extension: String,
        tar_argv: Vec<String>,
    },
    Builtin {
        extension: String,
        /// gzip level, `None` for an uncompressed tarball.
        level: Option<u32>,
        /// Wrap the payload in a tar container.
        container: bool,
    },
}

impl CommandDescriptor {
    pub fn extension(&self) -> &str {
        match self {
            CommandDescriptor::Compressor { extension, .. }
            | CommandDescriptor::Tar { extension, .. }
            | CommandDescriptor::Builtin { extension, .. } => extension,
        }
    }
}

impl Strategy {
    /// Binaries needed to realise `algorithm` in `mode`; `None` when this
    /// strategy cannot produce the algorithm at all.
    fn requirements(self, algorithm: Algorithm, mode: Mode) -> Option<Vec<&'static str>> {
        match (self, mode) {
            (Strategy::Standard, Mode::Standalone) => {
                Some(algorithm.binary().into_iter().collect())
            }
            (Strategy::Standard, Mode::TarIntegrated) => {
                Some(std::iter::once(TAR).chain(algorithm.binary()).collect())
            }
            (Strategy::Fallback, _) if algorithm == Algorithm::None => None,
            (Strategy::Fallback, Mode::Standalone) => Some(vec![FALLBACK_ARCHIVER]),
            (Strategy::Fallback, Mode::TarIntegrated) => Some(vec![TAR, FALLBACK_ARCHIVER]),
            (Strategy::Builtin, Mode::Standalone) => (algorithm == Algorithm::Gzip).then(Vec::new),
            (Strategy::Builtin, Mode::TarIntegrated) => {
                matches!(algorithm, Algorithm::None | Algorithm::Gzip).then(Vec::new)
            }
        }
    }

    fn build(self, profile: &CompressionProfile, mode: Mode) -> CommandDescriptor {
        let algorithm = profile.algorithm;
        match (self, mode) {
            (Strategy::Standard, Mode::Standalone) => {
                let argv: Vec<String> = match algorithm.binary() {
                    Some(binary) => std::iter::once(binary.to_string())
                        .chain(std::iter::once(format!("-{}", profile.level)))
                        .chain(profile.extra_flags.iter().cloned())
                        .collect(),
                    None => Vec::new(),
                };
                CommandDescriptor::Compressor {
                    env: BTreeMap::new(),
                    extension: algorithm.extension().to_string(),
                    standalone_argv: argv.clone(),
                    pipe_argv: argv,
                    sink: Sink::Stdout,
                }
            }
            (Strategy::Standard, Mode::TarIntegrated) => {
                let (env_var, flag) = tar_flags(algorithm);
                let mut env = BTreeMap::new();
                if let Some(env_var) = env_var {
                    let options: Vec<String> = std::iter::once(format!("-{}", profile.level))
                        .chain(profile.extra_flags.iter().cloned())
                        .collect();
                    env.insert(env_var.to_string(), options.join(" "));
                }
                CommandDescriptor::Tar {
                    env,
                    extension: format!(".tar{}", algorithm.extension()),
                    tar_argv: vec![TAR.to_string(), flag.to_string()],
                }
            }
            (Strategy::Fallback, _) => {
                let standalone_argv = vec![
                    FALLBACK_ARCHIVER.to_string(),
                    "a".to_string(),
                    format!("-t{algorithm}"),
                ];
                let mut pipe_argv = standalone_argv.clone();
                pipe_argv.push("-si".to_string());
                CommandDescriptor::Compressor {
                    env: BTreeMap::new(),
                    extension: algorithm.extension().to_string(),
                    standalone_argv,
                    pipe_argv,
                    sink: Sink::PathArgument,
                }
            }
            (Strategy::Builtin, mode) => {
                let container = mode == Mode::TarIntegrated;
                let level = (algorithm == Algorithm::Gzip).then_some(u32::from(profile.level));
                let prefix = if container { ".tar" } else { "" };
                CommandDescriptor::Builtin {
                    extension: format!("{prefix}{}", algorithm.extension()),
                    level,
                    container,
                }
            }
        }
    }
}

/// Environment variable and tar flag selecting the compressor.
fn tar_flags(algorithm: Algorithm) -> (Option<&'static str>, &'static str) {
    match algorithm {
        Algorithm::Xz => (Some("XZ_OPT"), "-cJf"),
        Algorithm::Gzip => (Some("GZIP"), "-czf"),
        Algorithm::Bzip2 => (Some("BZIP2"), "-cjf"),
        Algorithm::None => (None, "-cf"),
    }
}

/// Picks the first strategy, in the given order, whose binaries are all
/// available and builds its descriptor.
pub fn resolve<F>(
    profile: &CompressionProfile,
    mode: Mode,
    strategies: &[Strategy],
    binary_available: F,
) -> Result<CommandDescriptor>
where
    F: Fn(&str) -> bool,
{
    strategies
        .iter()
        .copied()
        .find(|strategy| {
            strategy
                .requirements(profile.algorithm, mode)
                .is_some_and(|binaries| binaries.iter().all(|&binary| binary_available(binary)))
        })
        .map(|strategy| strategy.build(profile, mode))
        .ok_or_else(|| BackupError::UnsupportedStrategy {
            algorithm: profile.algorithm.to_string(),
            mode: mode.to_string(),
        })
}
