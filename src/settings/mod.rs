//! Read-only filter preferences from `settings.conf`.
//!
//! The file stores the user's last sort method, show-system flag and reverse
//! flag. appselect only reads it; writing preferences is the UI's business.

use std::fs;
use std::path::Path;

use crate::state::{ConfigError, SortConfig, SortMethod};

mod parsing;
pub mod paths;

pub use paths::{config_dir, logs_dir, settings_path};

/// Skeleton written when no settings file exists yet.
pub const SETTINGS_SKELETON_CONTENT: &str = "# appselect settings\n\
#\n\
# Format: key = value\n\
# Lines starting with # are comments.\n\
#\n\
# Sort method for the package list:\n\
#   label | package_name | recent_update | recent_install\n\
sort_method = label\n\
#\n\
# Include system packages (true/false)\n\
show_system = false\n\
#\n\
# Reverse the sort order; checked packages always stay on top (true/false)\n\
reverse_order = false\n";

/// Persisted filter preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterPrefs {
    /// Tier-2 sort method.
    pub sort_method: SortMethod,
    /// Include system packages.
    pub show_system: bool,
    /// Reverse the tier-2 order.
    pub reverse_order: bool,
}

impl FilterPrefs {
    /// Combine with the per-session selected-only flag into a [`SortConfig`].
    pub const fn to_sort_config(self, filter_only_selected: bool) -> SortConfig {
        SortConfig {
            sort_method: self.sort_method,
            show_system: self.show_system,
            reverse_order: self.reverse_order,
            filter_only_selected,
        }
    }
}

/// What: Parse settings text into filter preferences.
///
/// Inputs:
/// - `content`: Full settings file text
///
/// Output:
/// - `Ok(FilterPrefs)` with defaults for absent keys; `Err(ConfigError)` for the
///   first invalid value
///
/// Details:
/// - Unknown keys are skipped; later entries override earlier ones.
pub fn parse_settings(content: &str) -> Result<FilterPrefs, ConfigError> {
    let mut out = FilterPrefs::default();
    for (idx, line) in content.lines().enumerate() {
        let Some((key, val)) = parsing::split_entry(line) else {
            continue;
        };
        let invalid = || ConfigError::InvalidValue {
            key: key.clone(),
            value: val.to_string(),
            line: idx + 1,
        };
        match key.as_str() {
            "sort_method" | "sort" | "filter_sort_method" => {
                out.sort_method = SortMethod::from_config_key(val).ok_or_else(invalid)?;
            }
            "show_system" | "filter_show_system" => {
                out.show_system = parsing::parse_bool(val).ok_or_else(invalid)?;
            }
            "reverse_order" | "reverse" | "filter_reverse_order" => {
                out.reverse_order = parsing::parse_bool(val).ok_or_else(invalid)?;
            }
            _ => tracing::debug!(key = %key, line = idx + 1, "ignoring unknown settings key"),
        }
    }
    Ok(out)
}

/// What: Load preferences from `path`, creating a skeleton when it is missing.
///
/// Inputs:
/// - `path`: Settings file
///
/// Output:
/// - Parsed preferences; defaults when the file had to be created
pub fn load_settings(path: &Path) -> Result<FilterPrefs, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if !path.is_file() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(path, SETTINGS_SKELETON_CONTENT).map_err(io_err)?;
        tracing::info!(path = %path.display(), "wrote default settings");
        return Ok(FilterPrefs::default());
    }
    let content = fs::read_to_string(path).map_err(io_err)?;
    let prefs = parse_settings(&content)?;
    tracing::debug!(
        path = %path.display(),
        sort_method = %prefs.sort_method,
        show_system = prefs.show_system,
        reverse_order = prefs.reverse_order,
        "settings loaded"
    );
    Ok(prefs)
}

#[cfg(test)]
static TEST_MUTEX: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();

#[cfg(test)]
pub(crate) fn test_mutex() -> &'static std::sync::Mutex<()> {
    TEST_MUTEX.get_or_init(|| std::sync::Mutex::new(()))
}
