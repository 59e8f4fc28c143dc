//! `config init`: the commented default template and the code that writes it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

/// Commented template whose values equal `Config::default()`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# gridboard configuration
#
# This file was auto-generated with default values.
# All values shown below are the built-in defaults.
#
# Location: $XDG_CONFIG_HOME/gridboard/config.toml

# ==============================================================================
# Grid
# ==============================================================================

[grid]

# Number of columns in the layout grid (1 to 256).
# Widgets wider than this are narrowed to fit.
columns = 12

# Height of one grid row, in pixels.
cell_height = 70

# Gap between neighbouring cells, in pixels.
margin = 10

# ==============================================================================
# Storage
# ==============================================================================

[storage]

# Directory holding saved layouts.
# Empty means $XDG_DATA_HOME/gridboard (usually ~/.local/share/gridboard).
# Tilde (~) is expanded to the user's home directory.
directory = ""

# Prefix for every stored key, without '/' or '..'. The layout is saved as
# <directory>/<namespace>widgets.json
namespace = "wit-widget-"

# ==============================================================================
# Logging
# ==============================================================================

[logging]

# Verbosity when GRIDBOARD_LOG is not set.
# Options: "error", "warn", "info", "debug", "trace"
level = "warn"
"#;

// ---------------------------------------------------------------------------
// File creation
// ---------------------------------------------------------------------------

/// Writes the template to the default XDG location. See [`create_config`].
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path();
    create_config(&path, force)?;
    Ok(path)
}

/// Writes the template to `path` with mode 0600.
///
/// An existing file is an error unless `force` is set, in which case it is
/// first renamed to `config.toml.backup` (replacing any older backup).
pub fn create_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let backup = path.with_extension("toml.backup");
        fs::rename(path, &backup).map_err(|source| ConfigError::WriteError {
            path: backup.clone(),
            source,
        })?;
        tracing::info!(backup = %backup.display(), "existing configuration backed up");
    }

    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        xdg::ensure_dir(parent).map_err(write_error)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }
    Ok(())
}
