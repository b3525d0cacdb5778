use super::collation::Collation;
use super::filter::apply_filters;
use super::sort::sort_keys;
use crate::sources::PackageMetadata;
use crate::state::{PackageKey, SelectionView, Snapshot, SortConfig};

/// What: Derive the visible, ordered package list from a snapshot.
///
/// Inputs:
/// - `snapshot`: All currently known package keys
/// - `selection`: Immutable view of the checked keys
/// - `config`: Filter and sort configuration
/// - `metadata`: Label, install-time and system lookups
/// - `collation`: Locale rules for label and name comparison
///
/// Output:
/// - New ordered list; inputs are left untouched
///
/// Details:
/// - Filter: drops unchecked keys when `filter_only_selected`, and system keys
///   unless `show_system`.
/// - Sort: checked keys first, then by `sort_method`; `reverse_order` flips only
///   the method order. Stable on ties.
/// - Lookup failures never abort; affected keys sort last in their group.
pub fn recompute<M>(
    snapshot: &Snapshot,
    selection: &SelectionView,
    config: &SortConfig,
    metadata: &M,
    collation: &Collation,
) -> Vec<PackageKey>
where
    M: PackageMetadata + ?Sized,
{
    if snapshot.is_empty() {
        return Vec::new();
    }
    let filtered = apply_filters(&snapshot.keys, selection, config, metadata);
    let out = sort_keys(&filtered, selection, config, metadata, collation);
    tracing::debug!(
        input = snapshot.len(),
        output = out.len(),
        method = %config.sort_method,
        reverse = config.reverse_order,
        show_system = config.show_system,
        only_selected = config.filter_only_selected,
        "list recomputed"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{PackageCatalog, PackageRecord};
    use crate::state::SortMethod;

    /// What: Catalog with two apps and one system package.
    fn scenario_catalog() -> PackageCatalog {
        PackageCatalog::new(vec![
            PackageRecord {
                label: Some("A".into()),
                first_install_time: Some(100),
                last_update_time: Some(100),
                system: Some(false),
                ..PackageRecord::bare("a.app")
            },
            PackageRecord {
                label: Some("B".into()),
                first_install_time: Some(200),
                last_update_time: Some(200),
                system: Some(false),
                ..PackageRecord::bare("b.app")
            },
            PackageRecord {
                label: Some("C".into()),
                first_install_time: Some(50),
                last_update_time: Some(50),
                system: Some(true),
                ..PackageRecord::bare("c.sys")
            },
        ])
        .unwrap()
    }

    fn scenario_config() -> SortConfig {
        SortConfig {
            sort_method: SortMethod::ByPackageName,
            show_system: false,
            reverse_order: false,
            filter_only_selected: false,
        }
    }

    #[test]
    /// What: Checked app first, system package hidden
    ///
    /// - Input: S={a.app,b.app,c.sys}, C={b.app}, by package name, system hidden
    /// - Output: [b.app, a.app]
    fn scenario_selected_first_system_hidden() {
        let cat = scenario_catalog();
        let sel: SelectionView = ["b.app"].into_iter().collect();
        let out = recompute(
            &cat.snapshot(),
            &sel,
            &scenario_config(),
            &cat,
            &Collation::root().unwrap(),
        );
        assert_eq!(out, vec!["b.app", "a.app"]);
    }

    #[test]
    /// What: Selected-only filter leaves just the checked app
    fn scenario_only_selected() {
        let cat = scenario_catalog();
        let sel: SelectionView = ["b.app"].into_iter().collect();
        let cfg = SortConfig {
            filter_only_selected: true,
            ..scenario_config()
        };
        let out = recompute(&cat.snapshot(), &sel, &cfg, &cat, &Collation::root().unwrap());
        assert_eq!(out, vec!["b.app"]);
    }

    #[test]
    /// What: Reversed install-time sort still keeps the checked app first
    fn scenario_recent_install_reversed() {
        let cat = scenario_catalog();
        let sel: SelectionView = ["b.app"].into_iter().collect();
        let cfg = SortConfig {
            sort_method: SortMethod::ByRecentInstall,
            reverse_order: true,
            ..scenario_config()
        };
        let out = recompute(&cat.snapshot(), &sel, &cfg, &cat, &Collation::root().unwrap());
        assert_eq!(out, vec!["b.app", "a.app"]);
    }

    #[test]
    fn empty_snapshot_gives_empty_list() {
        let cat = scenario_catalog();
        let out = recompute(
            &Snapshot::default(),
            &SelectionView::default(),
            &scenario_config(),
            &cat,
            &Collation::root().unwrap(),
        );
        assert!(out.is_empty());
    }

    #[test]
    /// What: Keys absent from the metadata source still pass through
    ///
    /// - Input: Snapshot key unknown to the catalog, system hidden, sort by label
    /// - Output: Key kept and placed after resolvable keys
    fn unknown_keys_are_kept() {
        let cat = scenario_catalog();
        let snap = Snapshot::new(["ghost", "a.app"]);
        let out = recompute(
            &snap,
            &SelectionView::default(),
            &SortConfig::default(),
            &cat,
            &Collation::root().unwrap(),
        );
        assert_eq!(out, vec!["a.app", "ghost"]);
    }
}
