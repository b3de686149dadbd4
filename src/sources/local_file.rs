//! Plain-file sources (`file` schema).
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::error::SourceError;
use super::helpers::fs::{copy_tree, occupied};
use super::{ContentSource, Context, Materialized, Schema, Source};

/// A file or directory from `<main>/<app>/files/` copied into the work tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalFileSource {
    #[serde(skip)]
    app: String,
    file: String,
    target_subdir: Option<String>,
}

impl LocalFileSource {
    /// Build a source for `file` of `app`, optionally placed under
    /// `target_subdir`.
    #[must_use]
    pub fn new(app: &str, file: &str, target_subdir: Option<&str>) -> Self {
        Self {
            app: app.to_string(),
            file: file.to_string(),
            target_subdir: target_subdir.map(String::from),
        }
    }

    /// Path of the input relative to the app's file store.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Where the copy lands under `work_dir`.
    #[must_use]
    pub fn destination(&self, work_dir: &Path) -> PathBuf {
        place(work_dir, self.target_subdir.as_deref(), &self.file)
    }
}

/// `work_dir[/subdir]/name`.
pub(super) fn place(work_dir: &Path, subdir: Option<&str>, name: &str) -> PathBuf {
    subdir
        .map_or_else(|| work_dir.to_path_buf(), |sub| work_dir.join(sub))
        .join(name)
}

impl ContentSource for LocalFileSource {
    fn schema(&self) -> Schema {
        Schema::File
    }

    fn description(&self) -> String {
        match &self.target_subdir {
            Some(sub) => format!("{} -> {sub}/{}", self.file, self.file),
            None => self.file.clone(),
        }
    }

    fn materialize(&self, ctx: &Context<'_>, _siblings: &[Source]) -> Result<Materialized> {
        let input = ctx.files_dir(&self.app).join(&self.file);
        if !input.exists() {
            return Err(SourceError::MissingInput { path: input }.into());
        }
        let dest = self.destination(ctx.work_dir);
        if occupied(&dest) {
            return Err(SourceError::DestinationExists { path: dest }.into());
        }
        copy_tree(&input, &dest)?;
        ctx.log
            .debug(&format!("copied {} to {}", input.display(), dest.display()));
        Ok(Materialized::Applied)
    }
}
