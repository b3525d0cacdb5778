use std::cmp::Ordering;

use super::collation::Collation;
use crate::sources::PackageMetadata;
use crate::state::{PackageKey, SelectionView, SortConfig, SortMethod, is_selected};

/// Tier-2 value resolved once per key before sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortValue {
    /// Lower-cased label or package name, compared by collation.
    Text(String),
    /// Timestamp, compared numerically.
    Time(i64),
}

/// Decorated key carried through the sort.
#[derive(Debug)]
struct SortEntry<'a> {
    key: &'a str,
    selected: bool,
    value: Option<SortValue>,
}

/// What: Look up the tier-2 value for `key` under `method`.
///
/// Output:
/// - `None` when the metadata source cannot answer
fn resolve_value<M>(key: &str, method: SortMethod, metadata: &M) -> Option<SortValue>
where
    M: PackageMetadata + ?Sized,
{
    match method {
        SortMethod::ByLabel => metadata.label(key).map(|l| SortValue::Text(l.to_lowercase())),
        SortMethod::ByPackageName => Some(SortValue::Text(key.to_lowercase())),
        SortMethod::ByRecentUpdate => metadata
            .install_times(key)
            .map(|t| SortValue::Time(t.last_update_time)),
        SortMethod::ByRecentInstall => metadata
            .install_times(key)
            .map(|t| SortValue::Time(t.first_install_time)),
    }
}

/// What: Compare two resolved tier-2 values.
///
/// Details:
/// - Unresolved values sort after resolved ones in both directions; only the
///   comparison between two resolved values is reversed.
fn compare_values(
    a: Option<&SortValue>,
    b: Option<&SortValue>,
    reverse: bool,
    collation: &Collation,
) -> Ordering {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };
    let ord = match (a, b) {
        (SortValue::Text(x), SortValue::Text(y)) => collation.compare(x, y),
        (SortValue::Time(x), SortValue::Time(y)) => x.cmp(y),
        // A single pass resolves every key under the same method.
        (SortValue::Text(_), SortValue::Time(_)) => Ordering::Less,
        (SortValue::Time(_), SortValue::Text(_)) => Ordering::Greater,
    };
    if reverse { ord.reverse() } else { ord }
}

/// What: Order filtered keys by selected-first grouping, then the configured method.
///
/// Inputs:
/// - `keys`: Filtered keys in snapshot order
/// - `selection`: Checked keys for this recomputation
/// - `config`: Sort method and reverse flag
/// - `metadata`: Label and install-time source
/// - `collation`: Locale rules for text comparison
///
/// Output:
/// - Newly allocated ordered keys
///
/// Details:
/// - Checked keys always come first; `reverse_order` only flips the method order.
/// - The sort is stable, so equal keys keep their snapshot order.
/// - Each key hits the metadata source at most once.
pub fn sort_keys<M>(
    keys: &[&PackageKey],
    selection: &SelectionView,
    config: &SortConfig,
    metadata: &M,
    collation: &Collation,
) -> Vec<PackageKey>
where
    M: PackageMetadata + ?Sized,
{
    let mut entries: Vec<SortEntry<'_>> = keys
        .iter()
        .map(|k| SortEntry {
            key: k.as_str(),
            selected: is_selected(k, selection),
            value: resolve_value(k, config.sort_method, metadata),
        })
        .collect();

    let unresolved = entries.iter().filter(|e| e.value.is_none()).count();
    if unresolved > 0 {
        tracing::debug!(
            method = %config.sort_method,
            unresolved,
            "metadata lookups failed; those packages sort last in their group"
        );
    }

    entries.sort_by(|a, b| {
        // Checked first, independent of reverse_order
        b.selected.cmp(&a.selected).then_with(|| {
            compare_values(
                a.value.as_ref(),
                b.value.as_ref(),
                config.reverse_order,
                collation,
            )
        })
    });
    entries.into_iter().map(|e| e.key.to_string()).collect()
}
