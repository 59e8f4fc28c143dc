//! Errors raised while locating, reading, validating or writing `config.toml`.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration failures. Every variant names the file involved.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read configuration file: {path}")]
    ReadError {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML, or a value has the wrong type.
    #[error("Invalid configuration at {path}:{line}:{column}: {message}")]
    ParseError {
        /// File containing the error.
        path: PathBuf,
        /// One-based line (0 when the parser gave no position).
        line: usize,
        /// One-based column (0 when the parser gave no position).
        column: usize,
        /// Parser message.
        message: String,
    },

    /// The file parsed but a value is unusable.
    #[error("Invalid configuration in {path}: {key} {reason}")]
    Invalid {
        /// File containing the value.
        path: PathBuf,
        /// Dotted key of the offending value.
        key: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A file given explicitly (e.g. `--config`) does not exist.
    #[error("Configuration file not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// `config init` without `--force` found an existing file.
    #[error("Configuration file already exists: {path} (use --force to overwrite)")]
    AlreadyExists {
        /// Existing file.
        path: PathBuf,
    },

    /// Creating the file, its directory or its backup failed.
    #[error("Failed to write configuration file: {path}")]
    WriteError {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
