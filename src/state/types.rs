//! Core value types shared by the engine, the catalog and the observer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Opaque identifier naming one package (e.g. `com.example.app`).
pub type PackageKey = String;

/// Full replacement view of every package key currently known to the source.
///
/// Snapshots are never patched; a new one replaces the previous one wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Keys in source order.
    pub keys: Vec<PackageKey>,
}

impl Snapshot {
    /// What: Build a snapshot from any iterable of string-like keys.
    ///
    /// Inputs:
    /// - `keys`: Package keys in source order
    ///
    /// Output:
    /// - `Snapshot` owning the keys
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PackageKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of keys in the snapshot.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Install bookkeeping for one package, in milliseconds since the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTimes {
    /// When the package was first installed.
    pub first_install_time: i64,
    /// When the package was last updated.
    pub last_update_time: i64,
}

/// Ordering criterion applied after the selected-first grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    /// Human-readable label, case-insensitive, locale collation.
    #[default]
    ByLabel,
    /// Package key itself, case-insensitive, locale collation.
    ByPackageName,
    /// Last update timestamp, oldest first.
    ByRecentUpdate,
    /// First install timestamp, oldest first.
    ByRecentInstall,
}

impl SortMethod {
    /// Canonical key written in `settings.conf`.
    pub const fn as_config_key(self) -> &'static str {
        match self {
            Self::ByLabel => "label",
            Self::ByPackageName => "package_name",
            Self::ByRecentUpdate => "recent_update",
            Self::ByRecentInstall => "recent_install",
        }
    }

    /// What: Resolve a settings value (canonical key or alias) to a sort method.
    ///
    /// Inputs:
    /// - `s`: Raw value, case and surrounding whitespace ignored
    ///
    /// Output:
    /// - `Some(SortMethod)` for known keys; `None` otherwise
    pub fn from_config_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "label" | "by_label" | "name" => Some(Self::ByLabel),
            "package_name" | "by_package_name" | "package" | "pkg" => Some(Self::ByPackageName),
            "recent_update" | "by_recent_update" | "update" | "updated" => {
                Some(Self::ByRecentUpdate)
            }
            "recent_install" | "by_recent_install" | "install" | "installed" => {
                Some(Self::ByRecentInstall)
            }
            _ => None,
        }
    }
}

impl FromStr for SortMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_config_key(s).ok_or_else(|| ConfigError::InvalidSortMethod(s.trim().to_string()))
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_key())
    }
}

/// Filter and sort configuration for one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SortConfig {
    /// Tier-2 comparator.
    pub sort_method: SortMethod,
    /// Keep packages classified as system.
    pub show_system: bool,
    /// Invert tier-2 order (selected-first grouping is never inverted).
    pub reverse_order: bool,
    /// Keep only checked packages.
    pub filter_only_selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Every canonical config key resolves back to its own variant
    fn sort_method_config_keys_are_canonical() {
        for m in [
            SortMethod::ByLabel,
            SortMethod::ByPackageName,
            SortMethod::ByRecentUpdate,
            SortMethod::ByRecentInstall,
        ] {
            assert_eq!(SortMethod::from_config_key(m.as_config_key()), Some(m));
        }
    }

    #[test]
    /// What: Aliases and separators are accepted, unknown values rejected with the raw value
    fn sort_method_aliases_and_rejection() {
        assert_eq!(
            SortMethod::from_config_key(" Recent-Install "),
            Some(SortMethod::ByRecentInstall)
        );
        assert_eq!("pkg".parse::<SortMethod>().ok(), Some(SortMethod::ByPackageName));
        match "size".parse::<SortMethod>() {
            Err(ConfigError::InvalidSortMethod(v)) => assert_eq!(v, "size"),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn snapshot_new_collects_keys() {
        let s = Snapshot::new(["a", "b"]);
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
        assert!(Snapshot::default().is_empty());
    }
}
