//! Filter/sort engine that turns a package snapshot into the visible list.
//!
//! The engine is a pure function of its inputs:
//! - [`filter`] removes unchecked keys (selected-only mode) and system keys.
//! - [`sort`] orders the rest: checked keys first, then by the configured
//!   method, with only the method order affected by `reverse_order`.
//! - [`collation`] supplies locale-aware text comparison for labels and names.
//! - [`recompute`] chains the stages and is what the list worker calls.

pub mod collation;
pub mod filter;
pub mod recompute;
pub mod sort;

// Re-export public APIs so callers can use `crate::logic::...`
pub use collation::{Collation, CollationError, detect_collation_locale};
pub use filter::{apply_filters, passes_filters};
pub use recompute::recompute;
pub use sort::sort_keys;
