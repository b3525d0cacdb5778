use std::env;
use std::path::{Path, PathBuf};

/// What: Resolve the appselect config directory without creating it.
///
/// Output:
/// - `$XDG_CONFIG_HOME/appselect` when set and non-empty, else
///   `$HOME/.config/appselect` (or `./.config/appselect` without HOME)
fn resolve_config_dir() -> PathBuf {
    if let Ok(p) = env::var("XDG_CONFIG_HOME")
        && !p.trim().is_empty()
    {
        return Path::new(&p).join("appselect");
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".config").join("appselect")
}

/// Config directory for appselect (ensured to exist)
pub fn config_dir() -> PathBuf {
    let dir = resolve_config_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::debug!(path = %dir.display(), error = %e, "could not create config dir");
    }
    dir
}

/// Logs directory under config: "<config>/logs" (ensured to exist)
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Settings file path: "<config>/settings.conf"
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.conf")
}
