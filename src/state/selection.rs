//! Checked-package bookkeeping shared between the UI side and the list worker.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use super::types::PackageKey;

/// Whether more than one package may be checked at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Checking a package unchecks every other one.
    Single,
    /// Any number of packages may be checked.
    #[default]
    Multi,
}

/// Live, shareable set of checked package keys.
///
/// Cloning is cheap and yields a handle to the same set, so the UI can toggle
/// entries while the list worker reads them through [`SelectionSet::view`].
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    inner: Arc<RwLock<HashSet<PackageKey>>>,
    mode: SelectionMode,
}

impl SelectionSet {
    /// What: Create a selection set seeded with the session's initial checked keys.
    ///
    /// Inputs:
    /// - `mode`: Single- or multi-select behavior for later toggles
    /// - `initial`: Keys checked when the session opens
    ///
    /// Output:
    /// - New `SelectionSet`
    ///
    /// Details:
    /// - In single mode only the first initial key is kept.
    pub fn new<I, S>(mode: SelectionMode, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PackageKey>,
    {
        let mut keys: HashSet<PackageKey> = HashSet::new();
        for key in initial {
            if mode == SelectionMode::Single && !keys.is_empty() {
                tracing::warn!("single-select session opened with several checked keys; keeping the first");
                break;
            }
            keys.insert(key.into());
        }
        Self {
            inner: Arc::new(RwLock::new(keys)),
            mode,
        }
    }

    /// Selection behavior this set was created with.
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether `key` is currently checked.
    pub fn is_checked(&self, key: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// What: Check or uncheck one key.
    ///
    /// Inputs:
    /// - `key`: Package to update
    /// - `checked`: Desired membership
    ///
    /// Details:
    /// - Single mode clears all other keys before checking `key`.
    pub fn set_checked(&self, key: &str, checked: bool) {
        let mut set = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if checked {
            if self.mode == SelectionMode::Single {
                set.clear();
            }
            set.insert(key.to_string());
        } else {
            set.remove(key);
        }
    }

    /// Flip membership of `key` and return the new state.
    pub fn toggle(&self, key: &str) -> bool {
        let now_checked = !self.is_checked(key);
        self.set_checked(key, now_checked);
        now_checked
    }

    /// Number of checked keys.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is checked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Immutable copy of the current membership, taken under a single read lock.
    pub fn view(&self) -> SelectionView {
        SelectionView(
            self.inner
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    /// Checked keys in ascending byte order, for reporting.
    pub fn keys(&self) -> Vec<PackageKey> {
        let mut out: Vec<PackageKey> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        out.sort();
        out
    }
}

/// Point-in-time copy of a [`SelectionSet`], used for one recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionView(HashSet<PackageKey>);

impl SelectionView {
    /// Whether `key` was checked when the view was taken.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Number of checked keys in the view.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the view holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<PackageKey>> FromIterator<S> for SelectionView {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<HashSet<PackageKey>> for SelectionView {
    fn from(set: HashSet<PackageKey>) -> Self {
        Self(set)
    }
}

/// Membership check used by the selected-first tier.
pub fn is_selected(key: &str, selection: &SelectionView) -> bool {
    selection.contains(key)
}
