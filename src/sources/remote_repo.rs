//! Remote-repository sources (`github` schema).
use anyhow::{Context as _, Result};
use glob::MatchOptions;
use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use super::repo_cache::RepoCache;
use super::{ContentSource, Context, Materialized, Schema, Source};
use crate::template::{Keyword, KeywordQuery};

/// File written next to an extracted snapshot, recording the commit it came
/// from.
pub const REF_ID_FILE: &str = "ref_id";

/// A snapshot of `repo_id` unpacked into `<work>/<target_dir>`.
///
/// With `target_files`, only those paths are extracted; without, the whole
/// tree is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRepoSource {
    repo_id: String,
    target_dir: String,
    target_files: Option<Vec<String>>,
}

impl RemoteRepoSource {
    /// Placeholder in a target directory that stands for the repository id.
    pub const REPO_PLACEHOLDER: &'static str = "${repo}";

    /// Build a source, expanding [`Self::REPO_PLACEHOLDER`] in `target_dir`.
    ///
    /// ```
    /// use mydot::sources::RemoteRepoSource;
    ///
    /// let s = RemoteRepoSource::new("alice/dots", ".zsh/${repo}", None);
    /// assert_eq!(s.target_dir(), ".zsh/alice/dots");
    /// ```
    #[must_use]
    pub fn new(repo_id: &str, target_dir: &str, target_files: Option<Vec<String>>) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            target_dir: target_dir.replace(Self::REPO_PLACEHOLDER, repo_id),
            target_files,
        }
    }

    /// Repository identifier, e.g. `owner/name`.
    #[must_use]
    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Extraction directory relative to the work directory.
    #[must_use]
    pub fn target_dir(&self) -> &str {
        &self.target_dir
    }

    /// Paths to extract, or `None` for the whole tree.
    #[must_use]
    pub fn target_files(&self) -> Option<&[String]> {
        self.target_files.as_deref()
    }

    fn checkout(&self, ctx: &Context<'_>, dest: &Path) -> Result<()> {
        let cache = RepoCache::new(ctx);
        let mirror = cache.ensure_mirror(&self.repo_id)?;
        cache.extract(
            &self.repo_id,
            &mirror,
            self.target_files().unwrap_or_default(),
            dest,
        )?;
        let head = cache.head_ref(&self.repo_id, &mirror)?;
        let ref_file = dest.join(REF_ID_FILE);
        std::fs::write(&ref_file, head)
            .with_context(|| format!("writing {}", ref_file.display()))
    }

    fn repo_files(&self, root: &Path, alternatives: &[String]) -> Vec<String> {
        let base = Path::new(&self.target_dir);
        let found: Vec<String> = match &self.target_files {
            Some(files) => files
                .iter()
                .flat_map(|file| {
                    let relative = base.join(file);
                    if root.join(&relative).is_file() {
                        vec![relative.to_string_lossy().into_owned()]
                    } else {
                        directory_fill(root, &relative, alternatives)
                    }
                })
                .collect(),
            None => directory_fill(root, base, alternatives),
        };
        dedup_in_order(found)
    }
}

impl ContentSource for RemoteRepoSource {
    fn schema(&self) -> Schema {
        Schema::Github
    }

    fn description(&self) -> String {
        match &self.target_files {
            Some(files) => format!(
                "{} -> {} ({})",
                self.repo_id,
                self.target_dir,
                files.join(", ")
            ),
            None => format!("{} -> {}", self.repo_id, self.target_dir),
        }
    }

    fn materialize(&self, ctx: &Context<'_>, _siblings: &[Source]) -> Result<Materialized> {
        std::fs::create_dir_all(ctx.work_dir)
            .with_context(|| format!("creating work dir {}", ctx.work_dir.display()))?;
        let dest = ctx.work_dir.join(&self.target_dir);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        // Claiming the directory is the existence check: whoever creates it
        // owns the checkout.
        match std::fs::create_dir(&dest) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                ctx.log.info(&format!(
                    "skip checkout: {} already exists",
                    dest.display()
                ));
                return Ok(Materialized::Skipped {
                    reason: "target directory exists".to_string(),
                });
            }
            Err(e) => {
                return Err(e).with_context(|| format!("creating {}", dest.display()));
            }
        }

        if let Err(err) = self.checkout(ctx, &dest) {
            if let Err(cleanup) = std::fs::remove_dir_all(&dest) {
                ctx.log.warn(&format!(
                    "could not remove partial checkout {}: {cleanup}",
                    dest.display()
                ));
            }
            return Err(err);
        }
        ctx.log
            .debug(&format!("checked out {} into {}", self.repo_id, dest.display()));
        Ok(Materialized::Applied)
    }

    fn answer_keyword(&self, root: &Path, query: &KeywordQuery) -> Vec<String> {
        match query.keyword {
            Keyword::RepoFile => self.repo_files(root, &query.alternatives),
        }
    }
}

/// Entries of `root/subdir` matching the first productive glob alternative.
///
/// Alternatives are tried in order; the first that matches anything wins and
/// its matches are returned sorted, as paths relative to `root` (that is,
/// prefixed with `subdir`). Matching is not recursive: `*` and `?` do not
/// cross `/`, and a run of stars such as `**` means the same as `*`. Hidden
/// entries only match a pattern that starts with a literal dot. A missing
/// directory yields nothing.
#[must_use]
pub fn directory_fill(root: &Path, subdir: &Path, alternatives: &[String]) -> Vec<String> {
    let dir = root.join(subdir);
    if !dir.is_dir() {
        return Vec::new();
    }
    let Some(dir_str) = dir.to_str() else {
        return Vec::new();
    };
    let escaped = glob::Pattern::escape(dir_str);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    for alternative in alternatives {
        if alternative.is_empty() {
            continue;
        }
        let pattern = format!("{escaped}/{}", collapse_stars(alternative));
        let Ok(paths) = glob::glob_with(&pattern, options) else {
            continue;
        };
        let mut matches: Vec<String> = paths
            .filter_map(Result::ok)
            .filter_map(|path| {
                let relative = path.strip_prefix(&dir).ok()?;
                (!relative.as_os_str().is_empty())
                    .then(|| subdir.join(relative).to_string_lossy().into_owned())
            })
            .collect();
        if !matches.is_empty() {
            matches.sort();
            return matches;
        }
    }
    Vec::new()
}

/// Replace every run of `*` with a single `*`.
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Drop repeated entries, keeping the first occurrence of each.
fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
