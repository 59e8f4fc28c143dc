//! Where gridboard keeps its files.
//!
//! | what            | override           | Linux default                | macOS default                          |
//! |-----------------|--------------------|------------------------------|----------------------------------------|
//! | `config.toml`   | `$XDG_CONFIG_HOME` | `~/.config/gridboard`        | `~/Library/Application Support/gridboard` |
//! | saved layouts   | `$XDG_DATA_HOME`   | `~/.local/share/gridboard`   | `~/Library/Application Support/gridboard` |
//!
//! The XDG variables win on every platform.

use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "gridboard";

/// `<base>/gridboard`, where `base` is `$var` when set, else `fallback()`.
fn app_dir(var: &str, fallback: fn() -> PathBuf) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map_or_else(fallback, PathBuf::from)
        .join(APP_NAME)
}

fn platform_config_base() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::config_dir().unwrap_or_else(home_dir)
    } else {
        home_dir().join(".config")
    }
}

fn platform_data_base() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::data_dir().unwrap_or_else(home_dir)
    } else {
        home_dir().join(".local/share")
    }
}

/// Home directory, or `.` when it cannot be determined.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Directory holding `config.toml`.
pub fn config_dir() -> PathBuf {
    app_dir("XDG_CONFIG_HOME", platform_config_base)
}

/// Default configuration file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default directory for layout snapshots.
pub fn data_dir() -> PathBuf {
    app_dir("XDG_DATA_HOME", platform_data_base)
}

/// Expands a leading `~` or `~/`. Other paths are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home_dir(),
        Some(rest) if rest.starts_with('/') => home_dir().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// `mkdir -p` with mode 0700 on the leaf.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}
