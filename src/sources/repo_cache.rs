//! Bare-repository mirrors shared across runs.
//!
//! Each repository id gets one bare mirror under `<main>/<cache_dir>/<id>`.
//! The first use clones it (shallow unless `clone_depth = 0`), later uses
//! fetch. Snapshots are produced with `git archive HEAD` piped into `tar`.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::Context;
use super::error::SourceError;
use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::Log;

/// Handle on the mirror directory for one run.
pub(super) struct RepoCache<'a> {
    dir: PathBuf,
    settings: &'a Settings,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> RepoCache<'a> {
    pub(super) fn new(ctx: &Context<'a>) -> Self {
        Self {
            dir: ctx.cache_dir(),
            settings: ctx.settings,
            executor: ctx.executor,
            log: ctx.log,
        }
    }

    /// Location of the mirror for `repo_id`.
    pub(super) fn mirror_path(&self, repo_id: &str) -> PathBuf {
        self.dir.join(repo_id)
    }

    /// Clone the mirror if absent, otherwise bring it up to date.
    pub(super) fn ensure_mirror(&self, repo_id: &str) -> Result<PathBuf> {
        let mirror = self.mirror_path(repo_id);
        if mirror.exists() {
            self.log.debug(&format!("fetching mirror {}", mirror.display()));
            let git_dir = git_dir_arg(&mirror);
            self.git("fetch", repo_id, &[git_dir.as_str(), "fetch", "-q"])?;
        } else {
            let url = self.settings.repo_url(repo_id);
            let dest = mirror.to_string_lossy();
            self.log.debug(&format!("cloning {url} into {dest}"));
            if let Some(parent) = mirror.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating cache dir {}", parent.display()))?;
            }
            let depth = format!("--depth={}", self.settings.clone_depth);
            let mut args = vec!["clone"];
            if self.settings.clone_depth > 0 {
                args.push(depth.as_str());
            }
            args.extend(["--bare", url.as_str(), &*dest]);
            self.git("clone", repo_id, &args)?;
        }
        Ok(mirror)
    }

    /// Unpack the mirror's `HEAD` (or just `files`, when non-empty) into `dest`.
    pub(super) fn extract(
        &self,
        repo_id: &str,
        mirror: &Path,
        files: &[String],
        dest: &Path,
    ) -> Result<()> {
        let git_dir = git_dir_arg(mirror);
        let mut archive = vec![git_dir.as_str(), "archive", "HEAD"];
        archive.extend(files.iter().map(String::as_str));
        let dest = dest.to_string_lossy();
        self.executor
            .pipe(("git", &archive), ("tar", &["xf", "-", "-C", &*dest]))
            .map_err(|e| command_failed("extract", repo_id, &e))?;
        Ok(())
    }

    /// Output of `git show-ref --head HEAD` for the mirror.
    pub(super) fn head_ref(&self, repo_id: &str, mirror: &Path) -> Result<String> {
        let git_dir = git_dir_arg(mirror);
        self.git(
            "show-ref",
            repo_id,
            &[git_dir.as_str(), "show-ref", "--head", "HEAD"],
        )
    }

    fn git(&self, operation: &'static str, repo_id: &str, args: &[&str]) -> Result<String> {
        let result = self
            .executor
            .run("git", args)
            .map_err(|e| command_failed(operation, repo_id, &e))?;
        Ok(result.stdout)
    }
}

fn git_dir_arg(mirror: &Path) -> String {
    format!("--git-dir={}", mirror.display())
}

fn command_failed(operation: &'static str, repo_id: &str, err: &anyhow::Error) -> SourceError {
    SourceError::CommandFailed {
        operation,
        repo: repo_id.to_string(),
        reason: format!("{err:#}"),
    }
}
