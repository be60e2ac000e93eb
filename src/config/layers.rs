// zabbixbackup/src/config/layers.rs
//! Ordered configuration sources. The first layer holding a key wins.

use std::collections::HashMap;

/// A named source of configuration values.
pub trait Layer {
    fn name(&self) -> &str;
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Layer backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MapLayer {
    name: String,
    values: HashMap<String, String>,
}

impl MapLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.values.insert(key.to_string(), value.into());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl Layer for MapLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A value together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: String,
    /// Position of the supplying layer, `0` being the highest priority.
    pub rank: usize,
}

/// Configuration layers in decreasing priority.
#[derive(Default)]
pub struct ConfigChain {
    layers: Vec<Box<dyn Layer>>,
}

impl ConfigChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer with lower priority than every layer already present.
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn resolve(&self, key: &str) -> Option<Resolved> {
        self.layers.iter().enumerate().find_map(|(rank, layer)| {
            layer.lookup(key).map(|value| Resolved {
                value,
                source: layer.name().to_string(),
                rank,
            })
        })
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_layer_wins() {
        let mut chain = ConfigChain::new();
        chain.push(MapLayer::new("cli").with("host", "10.0.0.1"));
        chain.push(MapLayer::new("zabbix").with("host", "db").with("user", "zbx"));
        chain.push(
            MapLayer::new("defaults")
                .with("host", "127.0.0.1")
                .with("user", "zabbix")
                .with("port", "5432"),
        );

        assert_eq!(
            chain.resolve("host"),
            Some(Resolved {
                value: "10.0.0.1".to_string(),
                source: "cli".to_string(),
                rank: 0,
            })
        );
        assert_eq!(chain.resolve("user").map(|r| r.rank), Some(1));
        assert_eq!(chain.resolve("user").map(|r| r.source), Some("zabbix".to_string()));
        assert_eq!(chain.resolve("port").map(|r| r.value), Some("5432".to_string()));
        assert_eq!(chain.resolve("schema"), None);
        assert_eq!(chain.layer_names(), vec!["cli", "zabbix", "defaults"]);
    }

    #[test]
    fn test_set_opt_skips_none() {
        let mut layer = MapLayer::new("cli");
        layer.set_opt("host", None::<String>);
        layer.set_opt("user", Some("admin"));

        assert_eq!(layer.lookup("host"), None);
        assert_eq!(layer.lookup("user").as_deref(), Some("admin"));
        assert_eq!(layer.len(), 1);
    }
}
