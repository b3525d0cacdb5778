//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::{self, FilterPrefs};
use crate::state::{ConfigError, SelectionMode, SortConfig, SortMethod};

/// appselect - derive a filtered, ordered package list from a catalog
#[derive(Parser, Debug, Clone)]
#[command(name = "appselect")]
#[command(version)]
#[command(about = "Derive a filtered, ordered package list from a package catalog", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Package catalog (JSON array of records, or {"packages": [...]})
    #[arg(short, long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Mark a package as checked (repeatable, or comma-separated)
    #[arg(short, long = "select", value_name = "KEY", value_delimiter = ',')]
    pub selected: Vec<String>,

    /// Single-select session: at most one package stays checked
    #[arg(long)]
    pub single: bool,

    /// Sort method: label, package_name, recent_update, recent_install (overrides settings)
    #[arg(long, value_name = "METHOD", value_parser = parse_sort_method)]
    pub sort: Option<SortMethod>,

    /// Include system packages (overrides settings)
    #[arg(long, value_name = "BOOL")]
    pub show_system: Option<bool>,

    /// Reverse the sort order; checked packages stay on top (overrides settings)
    #[arg(long, value_name = "BOOL")]
    pub reverse: Option<bool>,

    /// Show only checked packages
    #[arg(long)]
    pub only_selected: bool,

    /// Collation locale such as de-DE (default: from LC_ALL / LC_COLLATE / LANG)
    #[arg(long, value_name = "TAG")]
    pub locale: Option<String>,

    /// Keep running and re-emit the list whenever the catalog file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Catalog poll interval in milliseconds (with --watch)
    #[arg(long, default_value_t = 500, value_name = "MS")]
    pub poll_ms: u64,

    /// Print each list as a JSON array instead of one key per line
    #[arg(long)]
    pub json: bool,

    /// Configuration directory holding settings.conf (default: ~/.config/appselect)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Clap value parser that reuses the settings-file sort keys.
fn parse_sort_method(s: &str) -> Result<SortMethod, ConfigError> {
    s.parse()
}

impl Args {
    /// Selection mode requested for this session.
    pub const fn selection_mode(&self) -> SelectionMode {
        if self.single {
            SelectionMode::Single
        } else {
            SelectionMode::Multi
        }
    }

    /// What: Merge persisted preferences with command-line overrides.
    ///
    /// Inputs:
    /// - `prefs`: Preferences loaded from `settings.conf`
    ///
    /// Output:
    /// - `SortConfig` for the session
    pub fn sort_config(&self, prefs: FilterPrefs) -> SortConfig {
        FilterPrefs {
            sort_method: self.sort.unwrap_or(prefs.sort_method),
            show_system: self.show_system.unwrap_or(prefs.show_system),
            reverse_order: self.reverse.unwrap_or(prefs.reverse_order),
        }
        .to_sort_config(self.only_selected)
    }

    /// Settings file for this session: `--config-dir` when given, else the default.
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir
            .as_ref()
            .map_or_else(settings::settings_path, |dir| dir.join("settings.conf"))
    }

    /// Log directory for this session (ensured to exist).
    pub fn logs_dir(&self) -> PathBuf {
        match &self.config_dir {
            Some(dir) => {
                let logs = dir.join("logs");
                let _ = std::fs::create_dir_all(&logs);
                logs
            }
            None => settings::logs_dir(),
        }
    }
}

/// What: Determine the log level from args.
///
/// Output:
/// - `"debug"` when `--verbose`, otherwise `--log-level`
pub fn determine_log_level(args: &Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}
