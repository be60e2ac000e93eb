// zabbixbackup/src/backup/naming.rs
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

const PREFIX: &str = "zabbix_cfg";

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^zabbix_cfg_(?P<host>[^_]+)_",
        r"(?P<year>[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})-",
        r"(?P<hour>[0-9]{2})(?P<minute>[0-9]{2})_",
        r"(?P<version>[0-9]+(?:\.[0-9]+)*)",
        r"(?P<extension>(?:\.[A-Za-z0-9]*[A-Za-z][A-Za-z0-9]*)*)$",
    ))
    .expect("backup name pattern is valid")
});

/// Identity and timestamp encoded in a backup file or directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub host: String,
    /// `YYYYMMDDHHMM` as an integer, orders chronologically.
    pub timestamp: u64,
    pub version: String,
    /// Archive extension, empty for a plain directory.
    pub extension: String,
}

/// Makes a host usable as the `<host>` part of a backup name: no
/// underscores, no path separators, never empty.
pub fn identity_host(host: &str) -> String {
    if host.is_empty() || host.starts_with('/') {
        return "localhost".to_string();
    }
    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}

/// `zabbix_cfg_<host>_<YYYYMMDD>-<HHMM>_<version>`
pub fn backup_name(host: &str, at: NaiveDateTime, version: &str) -> String {
    format!("{PREFIX}_{}_{}_{version}", identity_host(host), at.format("%Y%m%d-%H%M"))
}

pub fn parse_backup_name(name: &str) -> Option<BackupName> {
    let captures = NAME_PATTERN.captures(name)?;
    let field = |key: &str| -> Option<u64> { captures.name(key)?.as_str().parse().ok() };

    let timestamp = field("year")? * 100_000_000
        + field("month")? * 1_000_000
        + field("day")? * 10_000
        + field("hour")? * 100
        + field("minute")?;

    Some(BackupName {
        host: captures.name("host")?.as_str().to_string(),
        timestamp,
        version: captures.name("version")?.as_str().to_string(),
        extension: captures.name("extension").map_or_else(String::new, |m| m.as_str().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .expect("valid test date")
    }

    #[test]
    fn test_backup_name_format() {
        assert_eq!(
            backup_name("127.0.0.1", at(2024, 3, 9, 7, 5), "6.4.10"),
            "zabbix_cfg_127.0.0.1_20240309-0705_6.4.10"
        );
    }

    #[test]
    fn test_identity_host_sanitised() {
        assert_eq!(identity_host(""), "localhost");
        assert_eq!(identity_host("/var/run/postgresql"), "localhost");
        assert_eq!(identity_host("db_primary.example"), "db-primary.example");
    }

    #[test]
    fn test_name_round_trip() {
        let stamp = at(2023, 12, 31, 23, 59);
        let name = backup_name("zbx-db", stamp, "7.0.1");
        let parsed = parse_backup_name(&name).expect("own names parse");

        assert_eq!(parsed.host, "zbx-db");
        assert_eq!(parsed.version, "7.0.1");
        assert_eq!(parsed.timestamp, 202312312359);
        assert_eq!(parsed.extension, "");
    }

    #[test]
    fn test_parse_archive_extensions() {
        for extension in [".tar", ".tar.gz", ".tar.xz", ".tar.bz2", ".sql", ".pgdump", ".7z"] {
            let name = format!("zabbix_cfg_host_19700101-0001_6.4.10{extension}");
            let parsed = parse_backup_name(&name).expect("valid name");
            assert_eq!(parsed.version, "6.4.10");
            assert_eq!(parsed.extension, extension);
        }
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        for name in [
            "zabbix_cfg_host_19700101-0001",
            "zabbix_127.0.0.1_19700101-000001",
            "zabbix_cfg_ho_st_19700101-0001_6.4.10",
            "zabbix_cfg_host_1970011-0001_6.4.10",
            "zabbix_cfg_host_19700101-0001_6.4.10.",
            "other_cfg_host_19700101-0001_6.4.10",
            "dump.log",
        ] {
            assert_eq!(parse_backup_name(name), None, "{name} should not parse");
        }
    }
}
