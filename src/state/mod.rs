//! Session state: value types, the shared selection set and config errors.
//!
//! Everything here is plain data; the behavior that derives the visible list
//! lives in [`crate::logic`].

pub mod error;
pub mod selection;
pub mod types;

// Public re-exports so callers can use `crate::state::*`
pub use error::ConfigError;
pub use selection::{SelectionMode, SelectionSet, SelectionView, is_selected};
pub use types::{InstallTimes, PackageKey, Snapshot, SortConfig, SortMethod};
