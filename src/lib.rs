//! Library entry for appselect exposing the list engine for integration tests.
//!
//! appselect derives the visible, ordered list of an app-selection screen
//! from a package snapshot, the checked set and the filter/sort settings, and
//! keeps that list current as the snapshot or settings change.

pub mod app;
pub mod args;
pub mod logic;
pub mod settings;
pub mod sources;
pub mod state;
