//! Reference list of the tables shipped by the Zabbix server schema.

mod tables;

use std::collections::HashMap;

/// One known Zabbix table.
///
/// `first_version`/`last_version` record the releases the table appeared in;
/// they are informational only and never used to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub first_version: &'static str,
    pub last_version: &'static str,
    /// Carries monitoring data (history, events, ...) rather than configuration.
    pub is_data: bool,
}

/// Read-only lookup over [`CatalogEntry`] records, built once at startup.
#[derive(Debug, Clone)]
pub struct TableCatalog {
    entries: HashMap<&'static str, CatalogEntry>,
}

impl TableCatalog {
    pub fn new(entries: &[CatalogEntry]) -> Self {
        Self {
            entries: entries.iter().map(|entry| (entry.name, *entry)).collect(),
        }
    }

    /// Catalog of the Zabbix server schema across supported releases.
    pub fn zabbix() -> Self {
        Self::new(tables::ZABBIX_TABLES)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn is_config(&self, name: &str) -> bool {
        self.get(name).is_some_and(|entry| !entry.is_data)
    }

    pub fn is_monitoring(&self, name: &str) -> bool {
        self.get(name).is_some_and(|entry| entry.is_data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
