//! TOML configuration schema types for gridboard.
//!
//! Every section is `#[serde(default)]`: a missing file, an empty file and a
//! file naming a single key all produce a usable [`Config`]. Unknown keys are
//! ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::xdg;
use crate::store::DEFAULT_NAMESPACE;
use crate::surface::GridOptions;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Parsed `config.toml`:
/// ```toml
/// [grid]
/// [storage]
/// [logging]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Layout grid geometry.
    pub grid: GridConfig,
    /// Where layout snapshots are stored.
    pub storage: StorageConfig,
    /// Log verbosity.
    pub logging: LoggingConfig,
}

/// Widest grid a config may ask for.
pub const MAX_COLUMNS: u32 = 256;

/// A setting that parsed but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    /// Dotted key, e.g. `grid.columns`.
    pub key: &'static str,
    /// What is wrong with the value.
    pub reason: &'static str,
}

impl Config {
    /// Checks values that are well-typed but unusable.
    ///
    /// An empty namespace would make `clear` reach keys the dashboard does
    /// not own. The namespace becomes part of a file name, so it may not name
    /// another directory.
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        if !(1..=MAX_COLUMNS).contains(&self.grid.columns) {
            return Err(InvalidSetting {
                key: "grid.columns",
                reason: "must be between 1 and 256",
            });
        }
        let namespace = &self.storage.namespace;
        if namespace.is_empty() {
            return Err(InvalidSetting {
                key: "storage.namespace",
                reason: "must not be empty",
            });
        }
        if namespace.contains(['/', '\\', '\0']) || namespace.contains("..") {
            return Err(InvalidSetting {
                key: "storage.namespace",
                reason: "must not contain path separators or '..'",
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Grid geometry handed to the layout engine.
///
/// Placement behavior (float mode, drag-out removal, external drops) is fixed
/// and not configurable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Row height in pixels.
    pub cell_height: u32,
    /// Gap between cells in pixels.
    pub margin: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        let options = GridOptions::default();
        Self {
            columns: options.columns,
            cell_height: options.cell_height,
            margin: options.margin,
        }
    }
}

impl GridConfig {
    /// Builds engine options from this section.
    pub fn to_options(&self) -> GridOptions {
        GridOptions {
            columns: self.columns.max(1),
            cell_height: self.cell_height,
            margin: self.margin,
            ..GridOptions::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Snapshot storage location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding snapshot files. Empty means the XDG data directory.
    pub directory: String,
    /// Prefix prepended to every storage key.
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolves the snapshot directory, expanding `~`.
    pub fn resolved_directory(&self) -> PathBuf {
        if self.directory.trim().is_empty() {
            xdg::data_dir()
        } else {
            xdg::expand_tilde(&self.directory)
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration from the `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Verbosity used when `GRIDBOARD_LOG` is not set.
    pub level: LogLevel,
}

/// `[logging] level`, written in lowercase.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings (default).
    #[default]
    Warn,
    /// Informational messages.
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
