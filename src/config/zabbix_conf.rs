// zabbixbackup/src/config/zabbix_conf.rs
//! Reads database settings out of a Zabbix server configuration file.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::layers::MapLayer;

pub const DEFAULT_ZABBIX_CONFIG: &str = "/etc/zabbix/zabbix_server.conf";

/// Zabbix option name and the configuration key it feeds.
const KEY_MAP: &[(&str, &str)] = &[
    ("DBHost", "host"),
    ("DBPort", "port"),
    ("DBName", "dbname"),
    ("DBSchema", "schema"),
    ("DBUser", "user"),
    ("DBPassword", "passwd"),
    ("DBSocket", "sock"),
];

/// Values set in the file and defaults documented in its comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZabbixConfig {
    pub values: HashMap<String, String>,
    pub defaults: HashMap<String, String>,
}

fn split_pair(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

impl ZabbixConfig {
    /// Parses `Key=value` lines. A `# Default:` comment makes the following
    /// commented `# Key=value` line a documented default. Empty values are
    /// skipped.
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::default();
        let mut expect_default = false;

        for line in contents.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if expect_default {
                expect_default = false;
                if let Some(commented) = line.strip_prefix('#') {
                    if let Some((key, value)) = split_pair(commented.trim_start_matches('#')) {
                        config.defaults.insert(key, value);
                    }
                    continue;
                }
            }

            if line.starts_with("# Default") {
                expect_default = true;
                continue;
            }

            if line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = split_pair(line) {
                config.values.insert(key, value);
            }
        }

        config
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read Zabbix config file at {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Layers for the explicit values and the documented defaults, keyed by
    /// configuration key names.
    pub fn layers(&self) -> (MapLayer, MapLayer) {
        (
            mapped_layer("zabbix config", &self.values),
            mapped_layer("zabbix config defaults", &self.defaults),
        )
    }
}

fn mapped_layer(name: &str, source: &HashMap<String, String>) -> MapLayer {
    let mut layer = MapLayer::new(name);
    for (zabbix_key, key) in KEY_MAP {
        layer.set_opt(key, source.get(*zabbix_key).cloned());
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layers::Layer;
    use std::io::Write;

    const SAMPLE: &str = "\
### Option: DBHost
#	Database host name.
#
# Mandatory: no
# Default:
# DBHost=localhost

DBHost=db.example.org

### Option: DBName
# Mandatory: yes
# Default:
# DBName=

DBName=zabbix_prod

### Option: DBSchema
# Default:
# DBSchema=public

### Option: DBUser
# Default:
# DBUser=

DBUser=zbx_srv

DBPassword=
DBPort=5433
";

    #[test]
    fn test_parse_values_and_defaults() {
        let config = ZabbixConfig::parse(SAMPLE);

        assert_eq!(config.values.get("DBHost").map(String::as_str), Some("db.example.org"));
        assert_eq!(config.values.get("DBName").map(String::as_str), Some("zabbix_prod"));
        assert_eq!(config.values.get("DBPort").map(String::as_str), Some("5433"));
        assert!(!config.values.contains_key("DBPassword"));

        assert_eq!(config.defaults.get("DBHost").map(String::as_str), Some("localhost"));
        assert_eq!(config.defaults.get("DBSchema").map(String::as_str), Some("public"));
        assert!(!config.defaults.contains_key("DBName"));
    }

    #[test]
    fn test_layers_use_configuration_keys() {
        let (values, defaults) = ZabbixConfig::parse(SAMPLE).layers();

        assert_eq!(values.lookup("host").as_deref(), Some("db.example.org"));
        assert_eq!(values.lookup("user").as_deref(), Some("zbx_srv"));
        assert_eq!(values.lookup("port").as_deref(), Some("5433"));
        assert_eq!(values.lookup("schema"), None);
        assert_eq!(defaults.lookup("schema").as_deref(), Some("public"));
        assert_eq!(values.name(), "zabbix config");
    }

    #[test]
    fn test_read_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"DBHost=10.1.1.1\nDBSocket=/run/postgresql\n")?;

        let config = ZabbixConfig::read(file.path())?;
        assert_eq!(config.values.len(), 2);
        Ok(())
    }

    #[test]
    fn test_read_missing_file() {
        assert!(ZabbixConfig::read(Path::new("/nonexistent/zabbix_server.conf")).is_err());
    }
}
