// zabbixbackup/src/backup/classify.rs
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::TableCatalog;

/// What to do with the data of known monitoring tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringAction {
    Dump,
    Nodata,
}

/// What to do with tables that are not part of the Zabbix schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownAction {
    Dump,
    Nodata,
    Ignore,
    Fail,
}

/// Discovered tables split by catalog membership. Every table lands in
/// exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub config: BTreeSet<String>,
    pub monitoring: BTreeSet<String>,
    pub unknown: BTreeSet<String>,
}

/// Tables to skip entirely (`ignore`), dump schema-only (`nodata`), or that
/// abort the run (`fail`). Lists are sorted and pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterLists {
    pub ignore: Vec<String>,
    pub nodata: Vec<String>,
    pub fail: Vec<String>,
}

/// Assigns every discovered table to the config, monitoring or unknown bucket.
pub fn classify<I, S>(discovered: I, catalog: &TableCatalog) -> Classification
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classification = Classification::default();

    for table in discovered {
        let table = table.as_ref();
        let bucket = if catalog.is_config(table) {
            &mut classification.config
        } else if catalog.is_monitoring(table) {
            &mut classification.monitoring
        } else {
            &mut classification.unknown
        };
        bucket.insert(table.to_string());
    }

    classification
}

/// Turns a classification into filter lists. Config tables are always dumped
/// with their data and never show up in any list.
pub fn apply_policy(
    classification: &Classification,
    monitoring: MonitoringAction,
    unknown: UnknownAction,
) -> FilterLists {
    let mut lists = FilterLists::default();

    if monitoring == MonitoringAction::Nodata {
        lists.nodata.extend(classification.monitoring.iter().cloned());
    }

    let unknown_target = match unknown {
        UnknownAction::Dump => None,
        UnknownAction::Nodata => Some(&mut lists.nodata),
        UnknownAction::Ignore => Some(&mut lists.ignore),
        UnknownAction::Fail => Some(&mut lists.fail),
    };
    if let Some(list) = unknown_target {
        list.extend(classification.unknown.iter().cloned());
    }

    lists.ignore.sort();
    lists.nodata.sort();
    lists.fail.sort();
    lists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use proptest::prelude::*;

    fn catalog() -> TableCatalog {
        TableCatalog::new(&[
            CatalogEntry {
                name: "hosts",
                first_version: "1.0",
                last_version: "7.0",
                is_data: false,
            },
            CatalogEntry {
                name: "items",
                first_version: "1.0",
                last_version: "7.0",
                is_data: false,
            },
            CatalogEntry {
                name: "history",
                first_version: "1.0",
                last_version: "7.0",
                is_data: true,
            },
            CatalogEntry {
                name: "trends",
                first_version: "1.0",
                last_version: "7.0",
                is_data: true,
            },
        ])
    }

    #[test]
    fn test_classify_buckets() {
        let result = classify(["history", "hosts", "custom_b", "items", "custom_a"], &catalog());

        assert_eq!(result.config, BTreeSet::from(["hosts".to_string(), "items".to_string()]));
        assert_eq!(result.monitoring, BTreeSet::from(["history".to_string()]));
        assert_eq!(
            result.unknown,
            BTreeSet::from(["custom_a".to_string(), "custom_b".to_string()])
        );
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify(Vec::<String>::new(), &catalog()), Classification::default());
    }

    #[test]
    fn test_policy_nodata_monitoring_ignore_unknown() {
        let classification = classify(["trends", "history", "hosts", "zz", "aa"], &catalog());
        let lists = apply_policy(&classification, MonitoringAction::Nodata, UnknownAction::Ignore);

        assert_eq!(lists.nodata, vec!["history", "trends"]);
        assert_eq!(lists.ignore, vec!["aa", "zz"]);
        assert!(lists.fail.is_empty());
    }

    #[test]
    fn test_policy_unknown_nodata_merges_sorted() {
        let classification = classify(["trends", "history", "b_custom"], &catalog());
        let lists = apply_policy(&classification, MonitoringAction::Nodata, UnknownAction::Nodata);

        assert_eq!(lists.nodata, vec!["b_custom", "history", "trends"]);
        assert!(lists.ignore.is_empty());
    }

    #[test]
    fn test_policy_dump_everything() {
        let classification = classify(["trends", "hosts", "custom"], &catalog());
        let lists = apply_policy(&classification, MonitoringAction::Dump, UnknownAction::Dump);

        assert_eq!(lists, FilterLists::default());
    }

    #[test]
    fn test_policy_fail_collects_unknown() {
        let classification = classify(["hosts", "rogue"], &catalog());
        let lists = apply_policy(&classification, MonitoringAction::Dump, UnknownAction::Fail);

        assert_eq!(lists.fail, vec!["rogue"]);
        assert!(lists.nodata.is_empty());
        assert!(lists.ignore.is_empty());
    }

    fn table_names() -> impl Strategy<Value = BTreeSet<String>> {
        let known = prop::sample::select(vec!["hosts", "items", "history", "trends"])
            .prop_map(String::from);
        let other = "[a-z_]{1,12}";
        prop::collection::btree_set(prop_oneof![known, other], 0..40)
    }

    fn action_pair() -> impl Strategy<Value = (MonitoringAction, UnknownAction)> {
        (
            prop::sample::select(vec![MonitoringAction::Dump, MonitoringAction::Nodata]),
            prop::sample::select(vec![
                UnknownAction::Dump,
                UnknownAction::Nodata,
                UnknownAction::Ignore,
                UnknownAction::Fail,
            ]),
        )
    }

    proptest! {
        #[test]
        fn prop_classification_partitions_input(tables in table_names()) {
            let result = classify(&tables, &catalog());

            prop_assert!(result.config.is_disjoint(&result.monitoring));
            prop_assert!(result.config.is_disjoint(&result.unknown));
            prop_assert!(result.monitoring.is_disjoint(&result.unknown));

            let union: BTreeSet<String> = result.config.iter()
                .chain(&result.monitoring)
                .chain(&result.unknown)
                .cloned()
                .collect();
            prop_assert_eq!(union, tables);
        }

        #[test]
        fn prop_filter_lists_disjoint_and_exclude_config(
            tables in table_names(),
            (monitoring, unknown) in action_pair(),
        ) {
            let classification = classify(&tables, &catalog());
            let lists = apply_policy(&classification, monitoring, unknown);

            let ignore: BTreeSet<_> = lists.ignore.iter().collect();
            let nodata: BTreeSet<_> = lists.nodata.iter().collect();
            let fail: BTreeSet<_> = lists.fail.iter().collect();
            prop_assert!(ignore.is_disjoint(&nodata));
            prop_assert!(ignore.is_disjoint(&fail));
            prop_assert!(nodata.is_disjoint(&fail));

            for table in &classification.config {
                prop_assert!(!ignore.contains(table));
                prop_assert!(!nodata.contains(table));
                prop_assert!(!fail.contains(table));
            }
        }
    }
}
