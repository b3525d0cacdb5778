//! Package metadata sources consumed by the filter/sort engine.
//!
//! The engine never talks to a package manager. It asks a [`PackageMetadata`]
//! implementation for labels, install times and the system classification,
//! and it tolerates any of those lookups failing.

use std::sync::Arc;

use crate::state::InstallTimes;

pub mod catalog;

pub use catalog::{CatalogError, PackageCatalog, PackageRecord, parse_records, read_records};

/// Read-only package metadata lookups.
///
/// Implementations are expected to answer from memory; the engine resolves
/// each key once per recomputation, but a slow source still stalls the list
/// worker for the whole pass.
pub trait PackageMetadata: Send + Sync {
    /// Human-readable label for `key`, or `None` when it cannot be resolved.
    fn label(&self, key: &str) -> Option<String>;

    /// First-install and last-update times for `key`, or `None` when unknown.
    fn install_times(&self, key: &str) -> Option<InstallTimes>;

    /// Whether `key` is a system package, or `None` when it cannot be classified.
    fn is_system(&self, key: &str) -> Option<bool>;
}

impl<T: PackageMetadata + ?Sized> PackageMetadata for Arc<T> {
    fn label(&self, key: &str) -> Option<String> {
        (**self).label(key)
    }

    fn install_times(&self, key: &str) -> Option<InstallTimes> {
        (**self).install_times(key)
    }

    fn is_system(&self, key: &str) -> Option<bool> {
        (**self).is_system(key)
    }
}
