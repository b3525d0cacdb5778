//! In-memory package catalog loaded from JSON.
//!
//! The catalog plays two roles: it answers [`PackageMetadata`] lookups from
//! memory, and it publishes a fresh [`Snapshot`] of its keys to every
//! subscriber whenever its records are replaced.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::PackageMetadata;
use crate::state::{InstallTimes, PackageKey, Snapshot};

/// One package entry as stored in the catalog file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Unique package key.
    pub package: PackageKey,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// First install time (ms since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_install_time: Option<i64>,
    /// Last update time (ms since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<i64>,
    /// System classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
}

impl PackageRecord {
    /// Record with only a key; every lookup on it fails except the key itself.
    pub fn bare(package: impl Into<PackageKey>) -> Self {
        Self {
            package: package.into(),
            label: None,
            first_install_time: None,
            last_update_time: None,
            system: None,
        }
    }
}

/// Accepted top-level shapes of a catalog file.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    /// Bare array of records.
    List(Vec<PackageRecord>),
    /// Object with a `packages` array.
    Wrapped {
        /// Records.
        packages: Vec<PackageRecord>,
    },
}

/// Errors produced while loading or replacing catalog records.
#[derive(Debug)]
pub enum CatalogError {
    /// Catalog file could not be read.
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Catalog JSON did not match either accepted shape.
    Parse(serde_json::Error),
    /// The same package key appeared twice.
    DuplicateKey(PackageKey),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "invalid catalog JSON: {err}"),
            Self::DuplicateKey(key) => write!(f, "duplicate package key \"{key}\""),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::DuplicateKey(_) => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Records plus a key index, swapped as a unit.
#[derive(Debug, Default)]
struct CatalogState {
    records: Vec<PackageRecord>,
    index: HashMap<PackageKey, usize>,
}

impl CatalogState {
    fn build(records: Vec<PackageRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            if index.insert(rec.package.clone(), i).is_some() {
                return Err(CatalogError::DuplicateKey(rec.package.clone()));
            }
        }
        Ok(Self { records, index })
    }

    fn get(&self, key: &str) -> Option<&PackageRecord> {
        self.index.get(key).and_then(|&i| self.records.get(i))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.records.iter().map(|r| r.package.clone()))
    }
}

/// Shared, replaceable package catalog.
#[derive(Debug, Default)]
pub struct PackageCatalog {
    state: RwLock<CatalogState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Snapshot>>>,
}

/// What: Parse catalog JSON into records without building a catalog.
///
/// Inputs:
/// - `raw`: JSON text, either an array of records or `{"packages": [...]}`
///
/// Output:
/// - `Ok(Vec<PackageRecord>)` in file order; `Err(CatalogError::Parse)` otherwise
pub fn parse_records(raw: &str) -> Result<Vec<PackageRecord>, CatalogError> {
    let file: CatalogFile = serde_json::from_str(raw)?;
    Ok(match file {
        CatalogFile::List(records) | CatalogFile::Wrapped { packages: records } => records,
    })
}

/// What: Read and parse a catalog file.
///
/// Inputs:
/// - `path`: Catalog JSON file
///
/// Output:
/// - Records in file order, or an I/O / parse error naming the file
pub fn read_records(path: &Path) -> Result<Vec<PackageRecord>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&raw)
}

impl PackageCatalog {
    /// What: Build a catalog from records.
    ///
    /// Inputs:
    /// - `records`: Package records; snapshot order follows this order
    ///
    /// Output:
    /// - `Ok(PackageCatalog)`; `Err(CatalogError::DuplicateKey)` if a key repeats
    pub fn new(records: Vec<PackageRecord>) -> Result<Self, CatalogError> {
        Ok(Self {
            state: RwLock::new(CatalogState::build(records)?),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Build a catalog from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Self::new(parse_records(raw)?)
    }

    /// What: Load a catalog from a JSON file.
    ///
    /// Inputs:
    /// - `path`: Catalog file
    ///
    /// Output:
    /// - Loaded catalog, or the first I/O / parse / duplicate error
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog = Self::new(read_records(path)?)?;
        tracing::info!(path = %path.display(), count = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.read_state().records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the record stored for `key`.
    pub fn record(&self, key: &str) -> Option<PackageRecord> {
        self.read_state().get(key).cloned()
    }

    /// Current keys in record order.
    pub fn snapshot(&self) -> Snapshot {
        self.read_state().snapshot()
    }

    /// What: Subscribe to snapshot updates.
    ///
    /// Output:
    /// - Receiver that already holds the current snapshot and then gets one
    ///   snapshot per [`PackageCatalog::replace`]
    ///
    /// Details:
    /// - Dropping the receiver unsubscribes; the sender is pruned on the next publish.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Hold the subscriber lock while reading so a concurrent replace cannot
        // publish between the replay and the registration.
        let _ = tx.send(self.snapshot());
        subs.push(tx);
        rx
    }

    /// Number of live subscribers (closed receivers are only pruned on publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// What: Swap in a new set of records and publish the resulting snapshot.
    ///
    /// Inputs:
    /// - `records`: Replacement records
    ///
    /// Output:
    /// - `Ok(())` once published; `Err(CatalogError::DuplicateKey)` leaves the
    ///   previous records in place and publishes nothing
    pub fn replace(&self, records: Vec<PackageRecord>) -> Result<(), CatalogError> {
        let next = CatalogState::build(records)?;
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = next;
            state.snapshot()
        };
        subs.retain(|tx| tx.send(snapshot.clone()).is_ok());
        tracing::debug!(
            keys = snapshot.len(),
            subscribers = subs.len(),
            "catalog snapshot published"
        );
        Ok(())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PackageMetadata for PackageCatalog {
    fn label(&self, key: &str) -> Option<String> {
        self.read_state().get(key).and_then(|r| r.label.clone())
    }

    fn install_times(&self, key: &str) -> Option<InstallTimes> {
        let state = self.read_state();
        let rec = state.get(key)?;
        Some(InstallTimes {
            first_install_time: rec.first_install_time?,
            last_update_time: rec.last_update_time?,
        })
    }

    fn is_system(&self, key: &str) -> Option<bool> {
        self.read_state().get(key).and_then(|r| r.system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "packages": [
            {"package": "a.app", "label": "Alpha", "first_install_time": 100, "last_update_time": 300, "system": false},
            {"package": "c.sys", "label": "Core", "first_install_time": 50, "last_update_time": 60, "system": true},
            {"package": "x.bare"}
        ]
    }"#;

    #[test]
    /// What: Wrapped JSON loads in file order and answers metadata lookups
    ///
    /// - Input: Three records, one without metadata
    /// - Output: Snapshot in file order; lookups on the bare record return None
    fn loads_wrapped_json_and_answers_lookups() {
        let cat = PackageCatalog::from_json_str(SAMPLE).unwrap();
        assert_eq!(cat.snapshot(), Snapshot::new(["a.app", "c.sys", "x.bare"]));
        assert_eq!(cat.label("a.app").as_deref(), Some("Alpha"));
        assert_eq!(cat.is_system("c.sys"), Some(true));
        assert_eq!(
            cat.install_times("a.app"),
            Some(InstallTimes {
                first_install_time: 100,
                last_update_time: 300
            })
        );
        assert_eq!(cat.label("x.bare"), None);
        assert_eq!(cat.install_times("x.bare"), None);
        assert_eq!(cat.is_system("missing"), None);
    }

    #[test]
    fn loads_bare_array() {
        let cat = PackageCatalog::from_json_str(r#"[{"package": "p"}]"#).unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.record("p"), Some(PackageRecord::bare("p")));
    }

    #[test]
    /// What: Install times need both timestamps to resolve
    fn partial_install_times_do_not_resolve() {
        let cat = PackageCatalog::from_json_str(r#"[{"package": "p", "first_install_time": 5}]"#)
            .unwrap();
        assert_eq!(cat.install_times("p"), None);
    }

    #[test]
    fn rejects_duplicates_and_bad_json() {
        let dup = PackageCatalog::new(vec![PackageRecord::bare("a"), PackageRecord::bare("a")]);
        assert!(matches!(dup, Err(CatalogError::DuplicateKey(k)) if k == "a"));
        assert!(matches!(
            PackageCatalog::from_json_str("{\"nope\": 1}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    /// What: Subscribers get the current snapshot first, then one per replace
    ///
    /// - Input: Subscribe, replace twice (second replace is invalid)
    /// - Output: Two snapshots delivered; failed replace keeps old records
    fn subscribe_replays_then_publishes() {
        let cat = PackageCatalog::new(vec![PackageRecord::bare("a")]).unwrap();
        let mut rx = cat.subscribe();
        assert_eq!(rx.try_recv().unwrap(), Snapshot::new(["a"]));

        cat.replace(vec![PackageRecord::bare("b"), PackageRecord::bare("a")])
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), Snapshot::new(["b", "a"]));

        assert!(
            cat.replace(vec![PackageRecord::bare("z"), PackageRecord::bare("z")])
                .is_err()
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(cat.snapshot(), Snapshot::new(["b", "a"]));
    }

    #[test]
    fn closed_subscribers_are_pruned_on_publish() {
        let cat = PackageCatalog::default();
        let rx = cat.subscribe();
        let _live = cat.subscribe();
        assert_eq!(cat.subscriber_count(), 2);
        drop(rx);
        cat.replace(vec![PackageRecord::bare("a")]).unwrap();
        assert_eq!(cat.subscriber_count(), 1);
    }

    #[test]
    fn read_records_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        match read_records(&path) {
            Err(CatalogError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
