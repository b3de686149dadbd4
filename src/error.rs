//! Domain-specific error types for the materializer.
//!
//! Internal modules return typed errors ([`ConfigError`], [`ManifestError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator. Errors raised while a
//! source is being materialized live next to the sources in
//! [`crate::sources::error`].
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError    — mydot.toml loading and validation
//! ManifestError  — dotconf parsing (construction-time failures)
//! SourceError    — materialization (see sources::error)
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::sources::Schema;

/// Errors that arise from loading the optional `mydot.toml` settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting holds a value that cannot be used.
    #[error("invalid value for '{key}' in {file}: {message}")]
    InvalidValue {
        /// Settings file that holds the value.
        file: String,
        /// Name of the offending key.
        key: &'static str,
        /// Human-readable explanation.
        message: String,
    },
}

/// Errors raised while turning a `dotconf` line into a content source.
///
/// These are fatal: a manifest that cannot be parsed aborts the run before
/// anything is materialized.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A schema line is missing one of its required tokens.
    #[error("{path}:{line}: '{schema}' entry is missing its {argument}")]
    MissingArgument {
        /// Manifest file being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Schema named by the first token.
        schema: Schema,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// A source could not be constructed from otherwise well-formed tokens.
    #[error("{path}:{line}: {source}")]
    InvalidSource {
        /// Manifest file being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The construction failure.
        source: crate::sources::error::SourceError,
    },

    /// The manifest file could not be read.
    #[error("IO error reading manifest {path}: {source}")]
    Io {
        /// Path to the manifest that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
