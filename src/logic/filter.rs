use crate::sources::PackageMetadata;
use crate::state::{PackageKey, SelectionView, SortConfig, is_selected};

/// What: Decide whether one key survives the filter stage.
///
/// Inputs:
/// - `key`: Package key from the snapshot
/// - `selection`: Checked keys for this recomputation
/// - `config`: Active filter flags
/// - `metadata`: System classification source
///
/// Output:
/// - `true` when the key stays in the working set
///
/// Details:
/// - Keys whose system classification cannot be resolved count as non-system.
pub fn passes_filters<M>(
    key: &str,
    selection: &SelectionView,
    config: &SortConfig,
    metadata: &M,
) -> bool
where
    M: PackageMetadata + ?Sized,
{
    if config.filter_only_selected && !is_selected(key, selection) {
        return false;
    }
    if !config.show_system {
        match metadata.is_system(key) {
            Some(true) => return false,
            Some(false) => {}
            None => tracing::debug!(package = %key, "system classification unavailable; keeping"),
        }
    }
    true
}

/// What: Apply the selected-only and system filters to snapshot keys.
///
/// Inputs:
/// - `keys`: Snapshot keys in source order
/// - `selection`, `config`, `metadata`: As for [`passes_filters`]
///
/// Output:
/// - Borrowed keys that pass both filters, in their original relative order
pub fn apply_filters<'a, M>(
    keys: &'a [PackageKey],
    selection: &SelectionView,
    config: &SortConfig,
    metadata: &M,
) -> Vec<&'a PackageKey>
where
    M: PackageMetadata + ?Sized,
{
    // Nothing to drop.
    if !config.filter_only_selected && config.show_system {
        return keys.iter().collect();
    }
    keys.iter()
        .filter(|k| passes_filters(k, selection, config, metadata))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{PackageCatalog, PackageRecord};

    fn catalog() -> PackageCatalog {
        let rec = |k: &str, system: Option<bool>| PackageRecord {
            system,
            ..PackageRecord::bare(k)
        };
        PackageCatalog::new(vec![
            rec("a.app", Some(false)),
            rec("b.app", Some(false)),
            rec("c.sys", Some(true)),
            rec("u.unknown", None),
        ])
        .unwrap()
    }

    fn keys() -> Vec<PackageKey> {
        ["a.app", "b.app", "c.sys", "u.unknown"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    /// What: Hiding system packages drops only keys classified as system
    ///
    /// - Input: One system key, one unclassifiable key
    /// - Output: System key removed, unclassifiable key kept, order preserved
    fn hides_system_keeps_unclassified() {
        let cfg = SortConfig::default();
        let keys = keys();
        let out = apply_filters(&keys, &SelectionView::default(), &cfg, &catalog());
        assert_eq!(out, vec!["a.app", "b.app", "u.unknown"]);
    }

    #[test]
    fn only_selected_and_system_filters_combine() {
        let cfg = SortConfig {
            filter_only_selected: true,
            ..SortConfig::default()
        };
        let sel: SelectionView = ["c.sys", "b.app"].into_iter().collect();
        let keys = keys();
        assert_eq!(apply_filters(&keys, &sel, &cfg, &catalog()), vec!["b.app"]);

        let cfg = SortConfig {
            show_system: true,
            ..cfg
        };
        assert_eq!(
            apply_filters(&keys, &sel, &cfg, &catalog()),
            vec!["b.app", "c.sys"]
        );
    }

    #[test]
    fn empty_selection_with_only_selected_is_empty() {
        let cfg = SortConfig {
            filter_only_selected: true,
            show_system: true,
            ..SortConfig::default()
        };
        let keys = keys();
        assert!(apply_filters(&keys, &SelectionView::default(), &cfg, &catalog()).is_empty());
    }
}
