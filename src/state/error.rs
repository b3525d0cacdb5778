//! Configuration errors raised while building a [`super::SortConfig`].

use std::fmt;
use std::path::PathBuf;

/// Error type for settings parsing and sort-config construction.
#[derive(Debug)]
pub enum ConfigError {
    /// Sort method value not recognized.
    InvalidSortMethod(String),
    /// Settings entry whose value could not be parsed.
    InvalidValue {
        /// Normalized settings key.
        key: String,
        /// Raw value as written.
        value: String,
        /// 1-based line number in the settings file.
        line: usize,
    },
    /// Settings file could not be read or created.
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSortMethod(v) => write!(
                f,
                "unknown sort method \"{v}\" (expected label, package_name, recent_update or recent_install)"
            ),
            Self::InvalidValue { key, value, line } => {
                write!(f, "line {line}: invalid value \"{value}\" for {key}")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidSortMethod(_) | Self::InvalidValue { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_key_value_and_line() {
        let e = ConfigError::InvalidValue {
            key: "show_system".into(),
            value: "maybe".into(),
            line: 4,
        };
        assert_eq!(e.to_string(), "line 4: invalid value \"maybe\" for show_system");
        assert!(std::error::Error::source(&e).is_none());
    }
}
