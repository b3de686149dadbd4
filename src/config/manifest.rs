//! `dotconf` manifest parsing.
//!
//! Each line is split on runs of spaces and tabs. The first token names the
//! schema; lines whose first token is not a known schema (comments, blank
//! lines, typos) are skipped.
//!
//! ```text
//! github   <repoId> <targetDir> [file...]
//! file     <file> [targetSubdir]
//! template <file>.template [targetSubdir]
//! ```
use serde::Serialize;
use std::path::Path;

use crate::error::ManifestError;
use crate::sources::{LocalFileSource, RemoteRepoSource, Schema, Source, TemplateSource};

/// Name of the manifest file inside each application directory.
pub const MANIFEST_FILE: &str = "dotconf";

/// The ordered sources declared by one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Application (directory) name.
    pub app: String,
    /// Sources in declaration order.
    pub sources: Vec<Source>,
}

impl Manifest {
    /// Sources in declaration order.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

/// Read and parse `<main_dir>/<app>/dotconf`.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the file cannot be read, or a parse
/// error from [`parse`].
pub fn load(main_dir: &Path, app: &str) -> Result<Manifest, ManifestError> {
    let path = main_dir.join(app).join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;
    parse(&path, app, &content)
}

/// Parse manifest `content` for `app`; `path` is used in error messages.
///
/// # Errors
///
/// Returns [`ManifestError::MissingArgument`] when a schema line lacks a
/// required token, and [`ManifestError::InvalidSource`] when a source
/// rejects its arguments.
pub fn parse(path: &Path, app: &str, content: &str) -> Result<Manifest, ManifestError> {
    let mut sources = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line
            .trim()
            .split([' ', '\t'])
            .filter(|t| !t.is_empty())
            .collect();
        let Some((&name, args)) = tokens.split_first() else {
            continue;
        };
        let Some(schema) = Schema::from_name(name) else {
            continue;
        };
        let entry = Entry {
            path,
            line: index + 1,
            schema,
            args,
        };
        sources.push(entry.build(app, sources.len() + 1)?);
    }
    Ok(Manifest {
        app: app.to_string(),
        sources,
    })
}

/// One schema line being turned into a source.
struct Entry<'a> {
    path: &'a Path,
    line: usize,
    schema: Schema,
    args: &'a [&'a str],
}

impl Entry<'_> {
    fn required(&self, index: usize, argument: &'static str) -> Result<&str, ManifestError> {
        self.args
            .get(index)
            .copied()
            .ok_or_else(|| ManifestError::MissingArgument {
                path: self.path.to_path_buf(),
                line: self.line,
                schema: self.schema,
                argument,
            })
    }

    fn optional(&self, index: usize) -> Option<&str> {
        self.args.get(index).copied()
    }

    /// `visible` is the number of sources (this one included) a template
    /// built from this line may consult.
    fn build(&self, app: &str, visible: usize) -> Result<Source, ManifestError> {
        let source = match self.schema {
            Schema::Github => {
                let repo_id = self.required(0, "repository id")?;
                let target_dir = self.required(1, "target directory")?;
                let files = self
                    .args
                    .get(2..)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| rest.iter().map(ToString::to_string).collect());
                RemoteRepoSource::new(repo_id, target_dir, files).into()
            }
            Schema::File => {
                let file = self.required(0, "file name")?;
                LocalFileSource::new(app, file, self.optional(1)).into()
            }
            Schema::Template => {
                let file = self.required(0, "file name")?;
                TemplateSource::new(app, file, self.optional(1), visible)
                    .map_err(|source| ManifestError::InvalidSource {
                        path: self.path.to_path_buf(),
                        line: self.line,
                        source,
                    })?
                    .into()
            }
        };
        Ok(source)
    }
}
