//! Compression profiles and their resolution into executable commands.

mod resolver;

pub use resolver::{resolve, CommandDescriptor, Mode, Sink, Strategy, DEFAULT_STRATEGIES};

use serde::Serialize;
use std::fmt;

use crate::errors::{BackupError, Result};

const DEFAULT_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    None,
    Gzip,
    Xz,
    Bzip2,
}

impl Algorithm {
    /// Native binary implementing the algorithm, if any.
    pub fn binary(self) -> Option<&'static str> {
        match self {
            Algorithm::None => None,
            Algorithm::Gzip => Some("gzip"),
            Algorithm::Xz => Some("xz"),
            Algorithm::Bzip2 => Some("bzip2"),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Algorithm::None => "",
            Algorithm::Gzip => ".gz",
            Algorithm::Xz => ".xz",
            Algorithm::Bzip2 => ".bz2",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "tar" | "none" => Some(Algorithm::None),
            "gzip" => Some(Algorithm::Gzip),
            "xz" => Some(Algorithm::Xz),
            "bzip2" => Some(Algorithm::Bzip2),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::None => "none",
            Algorithm::Gzip => "gzip",
            Algorithm::Xz => "xz",
            Algorithm::Bzip2 => "bzip2",
        };
        f.write_str(name)
    }
}

/// Requested compression outcome: algorithm, level 1-9 and extra flags
/// passed verbatim to the compressor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionProfile {
    pub algorithm: Algorithm,
    pub level: u8,
    pub extra_flags: Vec<String>,
}

impl CompressionProfile {
    pub fn new(algorithm: Algorithm, level: u8, extra_flags: Vec<String>) -> Self {
        Self {
            algorithm,
            level,
            extra_flags,
        }
    }
}

/// Parses `ALGO[:LEVEL[e]]`. A bare digit is read as a gzip level, `e` after
/// the level selects xz's extreme mode.
pub fn parse_profile(input: &str) -> Result<CompressionProfile> {
    let invalid = |reason: &str| BackupError::InvalidCompression {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (name, level_spec) = match input.split_once(':') {
        Some((name, level)) => (name, Some(level)),
        None => (input, None),
    };

    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        if level_spec.is_some() {
            return Err(invalid("a bare level cannot carry another level"));
        }
        let level = parse_level(name).ok_or_else(|| invalid("level must be between 1 and 9"))?;
        return Ok(CompressionProfile::new(Algorithm::Gzip, level, Vec::new()));
    }

    let algorithm = Algorithm::from_name(name).ok_or_else(|| invalid("unknown algorithm"))?;

    let Some(level_spec) = level_spec else {
        return Ok(CompressionProfile::new(algorithm, DEFAULT_LEVEL, Vec::new()));
    };

    let (digits, extreme) = match level_spec.strip_suffix('e') {
        Some(digits) => (digits, true),
        None => (level_spec, false),
    };
    let level = parse_level(digits).ok_or_else(|| invalid("level must be between 1 and 9"))?;

    let mut extra_flags = Vec::new();
    if extreme {
        if algorithm != Algorithm::Xz {
            return Err(invalid("extreme mode is only available for xz"));
        }
        extra_flags.push("--extreme".to_string());
    }

    Ok(CompressionProfile::new(algorithm, level, extra_flags))
}

/// Parses an archive option where `-` means "leave the backup as a directory".
pub fn parse_archive_option(input: &str) -> Result<Option<CompressionProfile>> {
    if input == "-" {
        return Ok(None);
    }
    parse_profile(input).map(Some)
}

fn parse_level(digits: &str) -> Option<u8> {
    if digits.len() != 1 {
        return None;
    }
    digits.parse::<u8>().ok().filter(|level| (1..=9).contains(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_valid() -> anyhow::Result<()> {
        let cases = [
            ("5", Algorithm::Gzip, 5, vec![]),
            ("gzip", Algorithm::Gzip, 6, vec![]),
            ("xz", Algorithm::Xz, 6, vec![]),
            ("xz:7", Algorithm::Xz, 7, vec![]),
            ("xz:7e", Algorithm::Xz, 7, vec!["--extreme".to_string()]),
            ("bzip2", Algorithm::Bzip2, 6, vec![]),
            ("bzip2:1", Algorithm::Bzip2, 1, vec![]),
            ("tar", Algorithm::None, 6, vec![]),
        ];

        for (input, algorithm, level, flags) in cases {
            let profile = parse_profile(input)?;
            let expected = CompressionProfile::new(algorithm, level, flags);
            assert_eq!(profile, expected, "input: {input:?}");
        }
        Ok(())
    }

    #[test]
    fn test_parse_profile_invalid() {
        let invalid = [
            "", "0", "xz:0", "gzip:0", "bzip2:0", "bzip2:6e", "something", "xz:10", "7:3",
        ];
        for input in invalid {
            let result = parse_profile(input);
            assert!(
                matches!(result, Err(BackupError::InvalidCompression { .. })),
                "input {input:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_parse_archive_option() -> anyhow::Result<()> {
        assert_eq!(parse_archive_option("-")?, None);
        assert_eq!(
            parse_archive_option("gzip:9")?,
            Some(CompressionProfile::new(Algorithm::Gzip, 9, vec![]))
        );
        Ok(())
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Algorithm::Gzip.extension(), ".gz");
        assert_eq!(Algorithm::Xz.extension(), ".xz");
        assert_eq!(Algorithm::Bzip2.extension(), ".bz2");
        assert_eq!(Algorithm::None.extension(), "");
    }
}
