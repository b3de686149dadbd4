// Shared helpers for integration tests.
//
// Provides a temporary main directory with a fluent builder, a fake `git`
// executor that serves snapshots from local "remote" directories, and a
// recording logger, so each integration test can run the real command code
// in an isolated environment without network access.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context as _, Result, bail};
use mydot::cli::GlobalOpts;
use mydot::exec::{ExecResult, Executor, Invocation};
use mydot::logging::{Log, SourceStatus};

/// Head reference reported by [`FakeGit`] for every mirror.
pub const FAKE_HEAD: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904 HEAD\n";

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// An isolated main directory, work directory and set of fake remotes
/// backed by a [`tempfile::TempDir`].
pub struct TestMainDir {
    /// Owns every directory below.
    pub root: tempfile::TempDir,
}

impl TestMainDir {
    /// Directory holding the applications (`<tmp>/main`).
    pub fn main_dir(&self) -> PathBuf {
        self.root.path().join("main")
    }

    /// Target tree (`<tmp>/work`).
    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    /// Directory holding the fake remote repositories (`<tmp>/remotes`).
    pub fn remotes_dir(&self) -> PathBuf {
        self.root.path().join("remotes")
    }

    /// Global options pointing at this layout.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            main_dir: Some(self.main_dir()),
            work_dir: Some(self.work_dir()),
            dry_run,
            progress: false,
        }
    }

    /// A [`FakeGit`] serving this layout's remotes.
    pub fn git(&self) -> FakeGit {
        FakeGit::new(self.remotes_dir())
    }

    /// Read a file from the work tree.
    pub fn read_work(&self, relative: &str) -> String {
        std::fs::read_to_string(self.work_dir().join(relative))
            .unwrap_or_else(|e| panic!("reading {relative}: {e}"))
    }

    /// Add (or replace) a file in a fake remote after the layout was built.
    pub fn add_remote_file(&self, repo_id: &str, relative: &str, content: &str) {
        write_file(&self.remotes_dir().join(repo_id).join(relative), content);
    }
}

/// Fluent builder for [`TestMainDir`].
pub struct MainDirBuilder {
    dir: TestMainDir,
}

impl MainDirBuilder {
    /// Begin building an empty main directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let dir = TestMainDir { root };
        std::fs::create_dir_all(dir.main_dir()).expect("create main dir");
        Self { dir }
    }

    /// Write the `dotconf` manifest of `app`.
    pub fn manifest(self, app: &str, content: &str) -> Self {
        write_file(&self.dir.main_dir().join(app).join("dotconf"), content);
        self
    }

    /// Write `files/<file>` into the store of `app`.
    pub fn store_file(self, app: &str, file: &str, content: &str) -> Self {
        write_file(
            &self.dir.main_dir().join(app).join("files").join(file),
            content,
        );
        self
    }

    /// Create a fake remote `repo_id` holding `files` (`(path, content)`).
    pub fn remote(self, repo_id: &str, files: &[(&str, &str)]) -> Self {
        for (relative, content) in files {
            self.dir.add_remote_file(repo_id, relative, content);
        }
        self
    }

    /// Write `mydot.toml` into the main directory.
    pub fn settings(self, content: &str) -> Self {
        write_file(&self.dir.main_dir().join("mydot.toml"), content);
        self
    }

    /// Finish building and return the layout.
    pub fn build(self) -> TestMainDir {
        self.dir
    }
}

/// A stand-in for `git` and `tar` that works on plain directories.
///
/// `clone` creates the mirror directory and remembers the URL it came from;
/// the `git archive | tar` pipe copies the matching remote directory (or
/// the listed paths) into the destination. Every invocation is recorded.
#[derive(Debug)]
pub struct FakeGit {
    remotes: PathBuf,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    fn new(remotes: PathBuf) -> Self {
        Self {
            remotes,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation so far, as `git <subcommand>` (or `archive|tar`).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("calls lock").push(call.to_string());
    }

    fn remote_for(&self, url: &str) -> Result<PathBuf> {
        let repo_id = url
            .trim_end_matches(".git")
            .splitn(4, '/')
            .nth(3)
            .with_context(|| format!("unexpected url {url}"))?;
        let remote = self.remotes.join(repo_id);
        if !remote.is_dir() {
            bail!("git failed (exit 128): repository '{url}' not found");
        }
        Ok(remote)
    }

    fn mirror_remote(git_dir_arg: &str) -> Result<String> {
        let mirror = git_dir_arg
            .strip_prefix("--git-dir=")
            .context("expected --git-dir")?;
        std::fs::read_to_string(Path::new(mirror).join("url")).context("mirror has no url")
    }

    fn ok(stdout: &str) -> ExecResult {
        ExecResult {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

fn copy_all(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dst)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_all(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
    }
    Ok(())
}

impl Executor for FakeGit {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        assert_eq!(program, "git", "only git is run directly");
        match args {
            ["clone", .., "--bare", url, dest] => {
                self.record("git clone");
                self.remote_for(url)?;
                std::fs::create_dir_all(dest)?;
                std::fs::write(Path::new(dest).join("url"), url)?;
                Ok(Self::ok(""))
            }
            [_, "fetch", "-q"] => {
                self.record("git fetch");
                Ok(Self::ok(""))
            }
            [_, "show-ref", "--head", "HEAD"] => {
                self.record("git show-ref");
                Ok(Self::ok(FAKE_HEAD))
            }
            other => bail!("unexpected git invocation: {other:?}"),
        }
    }

    fn pipe(&self, producer: Invocation<'_>, consumer: Invocation<'_>) -> Result<ExecResult> {
        self.record("archive|tar");
        let [git_dir, "archive", "HEAD", files @ ..] = producer.1 else {
            bail!("unexpected producer: {producer:?}");
        };
        let dest = consumer.1.last().context("missing tar destination")?;

        let remote = self.remote_for(&Self::mirror_remote(git_dir)?)?;
        if files.is_empty() {
            copy_all(&remote, Path::new(dest))?;
        } else {
            for file in files {
                let src = remote.join(file);
                if !src.exists() {
                    bail!("git failed (exit 128): pathspec '{file}' did not match any files");
                }
                copy_all(&src, &Path::new(dest).join(file))?;
            }
        }
        Ok(Self::ok(""))
    }

    fn which(&self, _: &str) -> bool {
        true
    }
}

/// Captures messages and recorded sources instead of printing.
#[derive(Debug, Default)]
pub struct RecordingLog {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    records: Mutex<Vec<(String, SourceStatus)>>,
}

impl RecordingLog {
    /// Warnings, in order.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("warnings lock").clone()
    }

    /// Errors, in order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors lock").clone()
    }

    /// Recorded `(name, status)` pairs, in order.
    pub fn records(&self) -> Vec<(String, SourceStatus)> {
        self.records.lock().expect("records lock").clone()
    }

    /// Recorded statuses only.
    pub fn statuses(&self) -> Vec<SourceStatus> {
        self.records().into_iter().map(|(_, s)| s).collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn debug(&self, _: &str) {}
    fn warn(&self, msg: &str) {
        self.warnings.lock().expect("warnings lock").push(msg.to_string());
    }
    fn error(&self, msg: &str) {
        self.errors.lock().expect("errors lock").push(msg.to_string());
    }
    fn dry_run(&self, _: &str) {}
    fn record(&self, name: &str, status: SourceStatus, _: Option<&str>) {
        self.records
            .lock()
            .expect("records lock")
            .push((name.to_string(), status));
    }
}
