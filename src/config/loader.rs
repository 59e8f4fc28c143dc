//! Reads `config.toml` into [`Config`].
//!
//! An explicitly named file must exist. The default XDG location is
//! optional: when nothing is there the built-in defaults apply. Either way
//! the parsed file is validated before it is returned, and every error
//! carries the file's path.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::xdg;

/// Stateless configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `explicit` when given, otherwise the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load_default(),
        }
    }

    /// Loads and validates the file at `path`.
    ///
    /// A missing file is [`ConfigError::NotFound`]; any other I/O failure is
    /// [`ConfigError::ReadError`].
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let config = Self::parse_toml(&content, path)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Loads the file at [`xdg::config_path`], or the defaults when absent.
    pub fn load_default() -> Result<Config, ConfigError> {
        let path = xdg::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }
        Self::load_from_path(&path)
    }

    /// Parses and validates `content`, attributing errors to `path`.
    fn parse_toml(content: &str, path: &Path) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map_or((0, 0), |span| line_and_column(content, span.start));
            ConfigError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })?;
        config.validate().map_err(|invalid| ConfigError::Invalid {
            path: path.to_path_buf(),
            key: invalid.key,
            reason: invalid.reason,
        })?;
        Ok(config)
    }
}

/// One-based line and column of byte `offset` in `content`.
fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}
