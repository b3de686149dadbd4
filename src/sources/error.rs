//! Typed error variants for content-source construction and materialization.
//!
//! Internal source code may return these variants directly; callers convert
//! to [`anyhow::Error`] via `?`.

use std::path::PathBuf;

use thiserror::Error;

use super::template::TEMPLATE_SUFFIX;

/// Errors that arise from constructing or materializing a content source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A template source was declared with a file lacking the template suffix.
    #[error("template file '{file}' should end with {suffix}", suffix = TEMPLATE_SUFFIX)]
    InvalidTemplateName {
        /// File name as written in the manifest.
        file: String,
    },

    /// An external command (git, tar) exited unsuccessfully.
    #[error("{operation} failed for '{repo}': {reason}")]
    CommandFailed {
        /// What was being attempted (`clone`, `fetch`, `extract`, ...).
        operation: &'static str,
        /// Repository the command was run for.
        repo: String,
        /// Message from the executor, including exit code and stderr.
        reason: String,
    },

    /// A plain-file destination is already present in the target tree.
    #[error("destination already exists: {path}")]
    DestinationExists {
        /// Destination that would have been overwritten.
        path: PathBuf,
    },

    /// A file referenced by the manifest is missing from the app's store.
    #[error("source file not found: {path}")]
    MissingInput {
        /// Expected location of the file.
        path: PathBuf,
    },
}
