//! Content sources: the declared units of content that make up a manifest.
//!
//! Each `dotconf` line produces one [`Source`]. Every source knows how to
//! (a) materialize itself into the target tree and (b) answer a keyword
//! query from a template with the relative paths it can supply.
//!
//! | schema     | type                  | materialization                   |
//! |------------|-----------------------|-----------------------------------|
//! | `github`   | [`RemoteRepoSource`]  | mirror + `git archive` extraction |
//! | `file`     | [`LocalFileSource`]   | copy from the app's `files/`      |
//! | `template` | [`TemplateSource`]    | line-by-line template expansion   |
pub mod error;
mod helpers;
pub mod local_file;
pub mod remote_repo;
mod repo_cache;
pub mod template;

pub use local_file::LocalFileSource;
pub use remote_repo::RemoteRepoSource;
pub use template::TemplateSource;

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::Log;
use crate::template::KeywordQuery;

/// Per-application directory holding plain files and templates.
pub const FILES_DIR: &str = "files";

/// Schema name: the first token of a `dotconf` line.
///
/// ```
/// use mydot::sources::Schema;
///
/// assert_eq!(Schema::from_name("github"), Some(Schema::Github));
/// assert_eq!(Schema::from_name("#"), None);
/// assert_eq!(Schema::Template.to_string(), "template");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// A snapshot of a remote repository.
    Github,
    /// A plain file or directory copied from the app's store.
    File,
    /// A template expanded against earlier sources.
    Template,
}

impl Schema {
    /// Map a schema name to its variant; unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "github" => Some(Self::Github),
            "file" => Some(Self::File),
            "template" => Some(Self::Template),
            _ => None,
        }
    }

    /// Name as written in a manifest.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::File => "file",
            Self::Template => "template",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Shared state for materializing sources.
pub struct Context<'a> {
    /// Directory holding the applications and the repository cache.
    pub main_dir: &'a Path,
    /// Target tree that sources are materialized into.
    pub work_dir: &'a Path,
    /// Settings loaded from `mydot.toml`.
    pub settings: &'a Settings,
    /// Command executor (for testing or real system calls).
    pub executor: &'a dyn Executor,
    /// Logger for diagnostics.
    pub log: &'a dyn Log,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("main_dir", &self.main_dir)
            .field("work_dir", &self.work_dir)
            .field("settings", &self.settings)
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl Context<'_> {
    /// File store of `app`.
    #[must_use]
    pub fn files_dir(&self, app: &str) -> PathBuf {
        self.main_dir.join(app).join(FILES_DIR)
    }

    /// Directory holding the bare repository mirrors.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.main_dir.join(&self.settings.cache_dir)
    }
}

/// Outcome of a successful materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// Output was written.
    Applied,
    /// Nothing was written because the output is already in place.
    Skipped {
        /// Why the source was skipped.
        reason: String,
    },
}

/// Behaviour shared by every content source.
pub trait ContentSource {
    /// Schema this source was declared with.
    fn schema(&self) -> Schema;

    /// Human-readable description, used in logs and listings.
    fn description(&self) -> String;

    /// Produce this source's output under `ctx.work_dir`.
    ///
    /// `siblings` is the owning manifest's source list; only templates look
    /// at it.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails, an input is missing, or the
    /// output cannot be written.
    fn materialize(&self, ctx: &Context<'_>, siblings: &[Source]) -> Result<Materialized>;

    /// Relative paths (under `root`, the materialized tree) this source can
    /// supply for `query`.
    ///
    /// The default supplies nothing.
    fn answer_keyword(&self, root: &Path, query: &KeywordQuery) -> Vec<String> {
        let _ = (root, query);
        Vec::new()
    }
}

/// A parsed `dotconf` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "schema", rename_all = "lowercase")]
pub enum Source {
    /// `github <repoId> <targetDir> [files...]`
    Github(RemoteRepoSource),
    /// `file <file> [targetSubdir]`
    File(LocalFileSource),
    /// `template <file> [targetSubdir]`
    Template(TemplateSource),
}

impl Source {
    fn inner(&self) -> &dyn ContentSource {
        match self {
            Self::Github(s) => s,
            Self::File(s) => s,
            Self::Template(s) => s,
        }
    }
}

impl ContentSource for Source {
    fn schema(&self) -> Schema {
        self.inner().schema()
    }

    fn description(&self) -> String {
        self.inner().description()
    }

    fn materialize(&self, ctx: &Context<'_>, siblings: &[Source]) -> Result<Materialized> {
        self.inner().materialize(ctx, siblings)
    }

    fn answer_keyword(&self, root: &Path, query: &KeywordQuery) -> Vec<String> {
        self.inner().answer_keyword(root, query)
    }
}

impl From<RemoteRepoSource> for Source {
    fn from(source: RemoteRepoSource) -> Self {
        Self::Github(source)
    }
}

impl From<LocalFileSource> for Source {
    fn from(source: LocalFileSource) -> Self {
        Self::File(source)
    }
}

impl From<TemplateSource> for Source {
    fn from(source: TemplateSource) -> Self {
        Self::Template(source)
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::template::{Keyword, KeywordQuery};
    use test_helpers::Fixture;

    #[test]
    fn schema_round_trips_names() {
        for schema in [Schema::Github, Schema::File, Schema::Template] {
            assert_eq!(Schema::from_name(schema.name()), Some(schema));
        }
    }

    #[test]
    fn unknown_schema_name_is_none() {
        assert_eq!(Schema::from_name("svn"), None);
        assert_eq!(Schema::from_name("GitHub"), None);
        assert_eq!(Schema::from_name(""), None);
    }

    #[test]
    fn enum_dispatches_to_variant() {
        let source: Source = RemoteRepoSource::new("alice/dots", "${repo}", None).into();
        assert_eq!(source.schema(), Schema::Github);
        assert!(source.description().contains("alice/dots"));
    }

    #[test]
    fn non_repo_sources_answer_nothing() {
        let fx = Fixture::new(vec![]);
        fx.work_file("vimrc", "x");
        let query = KeywordQuery {
            keyword: Keyword::RepoFile,
            alternatives: vec!["*".to_string()],
        };
        let file: Source = LocalFileSource::new("vim", "vimrc", None).into();
        let template: Source = TemplateSource::new("vim", "vimrc.template", None, 1)
            .unwrap()
            .into();
        assert!(file.answer_keyword(&fx.work_dir, &query).is_empty());
        assert!(template.answer_keyword(&fx.work_dir, &query).is_empty());
    }

    #[test]
    fn context_paths() {
        let fx = Fixture::new(vec![]);
        let ctx = fx.ctx();
        assert_eq!(ctx.files_dir("vim"), fx.main_dir.join("vim").join("files"));
        assert_eq!(ctx.cache_dir(), fx.main_dir.join(".repo"));
    }

    #[test]
    fn serializes_with_schema_tag() {
        let source: Source = LocalFileSource::new("vim", "vimrc", Some(".config")).into();
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["schema"], "file");
        assert_eq!(json["file"], "vimrc");
        assert_eq!(json["target_subdir"], ".config");
    }
}
