#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `sync` command.
//!
//! These tests run the real discovery, parsing and materialization code
//! against a temporary main directory, with [`common::FakeGit`] standing in
//! for `git` and `tar`.

mod common;

use common::{FAKE_HEAD, MainDirBuilder, RecordingLog};
use mydot::cli::AppFilter;
use mydot::commands::sync::sync;
use mydot::logging::SourceStatus;

// ---------------------------------------------------------------------------
// Template expansion against an extracted repository
// ---------------------------------------------------------------------------

#[test]
fn template_lists_files_from_earlier_repo() {
    let dir = MainDirBuilder::new()
        .remote(
            "alice/dots",
            &[("a.sh", "echo a"), ("b.sh", "echo b"), ("README.md", "")],
        )
        .manifest(
            "zsh",
            "github alice/dots .zsh/${repo}\ntemplate zshrc.template\n",
        )
        .store_file(
            "zsh",
            "zshrc.template",
            "# generated\n$template(source ~/${github_file:*.sh})\nexport EDITOR=vim\n",
        )
        .build();
    let git = dir.git();
    let log = RecordingLog::default();

    sync(&dir.global(false), &AppFilter::default(), &git, &log).unwrap();

    insta::assert_snapshot!(dir.read_work("zshrc"), @r"
    # generated
    source ~/.zsh/alice/dots/a.sh
    source ~/.zsh/alice/dots/b.sh
    export EDITOR=vim
    ");
    assert_eq!(dir.read_work(".zsh/alice/dots/ref_id"), FAKE_HEAD);
    assert!(dir.main_dir().join(".repo/alice/dots").is_dir());
    assert_eq!(git.calls(), ["git clone", "archive|tar", "git show-ref"]);
    assert_eq!(log.statuses(), [SourceStatus::Ok, SourceStatus::Ok]);
}

#[test]
fn explicit_file_list_limits_extraction_and_answers() {
    let dir = MainDirBuilder::new()
        .remote(
            "bob/plugins",
            &[
                ("init.zsh", ""),
                ("extra/one.zsh", ""),
                ("extra/two.zsh", ""),
                ("ignored.zsh", ""),
            ],
        )
        .manifest(
            "zsh",
            "github bob/plugins plugins init.zsh extra\ntemplate plugins.zsh.template\n",
        )
        .store_file(
            "zsh",
            "plugins.zsh.template",
            "$template(source ${repository file:*.zsh})\n",
        )
        .build();
    let log = RecordingLog::default();

    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap();

    assert!(!dir.work_dir().join("plugins/ignored.zsh").exists());
    insta::assert_snapshot!(dir.read_work("plugins.zsh"), @r"
    source plugins/init.zsh
    source plugins/extra/one.zsh
    source plugins/extra/two.zsh
    ");
}

#[test]
fn templates_only_see_their_own_manifest() {
    let dir = MainDirBuilder::new()
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("a-repo", "github alice/dots dots\n")
        .manifest("b-template", "template rc.template\n")
        .store_file("b-template", "rc.template", "$template(${github_file:*.sh})\n")
        .build();
    let log = RecordingLog::default();

    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap();

    assert!(dir.work_dir().join("dots/a.sh").is_file());
    assert_eq!(dir.read_work("rc"), "");
}

#[test]
fn directive_without_keyword_is_reported_and_dropped() {
    let dir = MainDirBuilder::new()
        .manifest("x", "template rc.template\n")
        .store_file("x", "rc.template", "before\n$template(plain text)\nafter\n")
        .build();
    let log = RecordingLog::default();

    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap();

    assert_eq!(dir.read_work("rc"), "before\nafter\n");
    assert_eq!(log.warnings().len(), 1);
}

// ---------------------------------------------------------------------------
// Re-runs
// ---------------------------------------------------------------------------

#[test]
fn rerun_skips_checkout_without_git_and_refreshes_template() {
    let dir = MainDirBuilder::new()
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("zsh", "github alice/dots dots\ntemplate rc.template\n")
        .store_file("zsh", "rc.template", "$template(${github_file:*.sh})\n")
        .build();
    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &RecordingLog::default())
        .unwrap();

    // New upstream content is not picked up: the existing checkout wins.
    dir.add_remote_file("alice/dots", "b.sh", "");
    std::fs::write(dir.work_dir().join("rc"), "stale").unwrap();
    let git = dir.git();
    let log = RecordingLog::default();

    sync(&dir.global(false), &AppFilter::default(), &git, &log).unwrap();

    assert!(git.calls().is_empty(), "unexpected git calls: {:?}", git.calls());
    assert_eq!(log.statuses(), [SourceStatus::Skipped, SourceStatus::Ok]);
    assert_eq!(dir.read_work("rc"), "dots/a.sh\n");
}

#[test]
fn second_checkout_of_cached_repo_fetches() {
    let dir = MainDirBuilder::new()
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("one", "github alice/dots first\n")
        .manifest("two", "github alice/dots second\n")
        .build();
    let git = dir.git();

    sync(&dir.global(false), &AppFilter::default(), &git, &RecordingLog::default()).unwrap();

    assert_eq!(
        git.calls(),
        [
            "git clone",
            "archive|tar",
            "git show-ref",
            "git fetch",
            "archive|tar",
            "git show-ref"
        ]
    );
    assert!(dir.work_dir().join("first/a.sh").is_file());
    assert!(dir.work_dir().join("second/a.sh").is_file());
}

#[test]
fn rerun_with_plain_file_fails_on_existing_destination() {
    let dir = MainDirBuilder::new()
        .manifest("vim", "file vimrc\n")
        .store_file("vim", "vimrc", "set nu\n")
        .build();
    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &RecordingLog::default())
        .unwrap();

    let log = RecordingLog::default();
    let err = sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap_err();

    assert!(format!("{err:#}").contains("destination already exists"));
    assert_eq!(log.statuses(), [SourceStatus::Failed]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn failed_clone_leaves_no_directory_and_retry_succeeds() {
    let dir = MainDirBuilder::new()
        .manifest("zsh", "github alice/missing dots\n")
        .build();
    let log = RecordingLog::default();

    let err = sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap_err();

    assert!(format!("{err:#}").contains("clone failed for 'alice/missing'"));
    assert!(!dir.work_dir().join("dots").exists());
    assert_eq!(log.errors().len(), 1);

    dir.add_remote_file("alice/missing", "x.sh", "");
    let log = RecordingLog::default();
    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &log).unwrap();
    assert_eq!(log.statuses(), [SourceStatus::Ok]);
    assert!(dir.work_dir().join("dots/x.sh").is_file());
}

#[test]
fn bad_template_name_stops_before_anything_is_written() {
    let dir = MainDirBuilder::new()
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("zsh", "github alice/dots dots\ntemplate notes.txt\n")
        .store_file("zsh", "notes.txt", "")
        .build();
    let git = dir.git();
    let log = RecordingLog::default();

    let err = sync(&dir.global(false), &AppFilter::default(), &git, &log).unwrap_err();

    assert!(err.to_string().contains("notes.txt"));
    assert!(git.calls().is_empty());
    assert!(!dir.work_dir().exists());
}

#[test]
fn missing_argument_names_manifest_line() {
    let dir = MainDirBuilder::new()
        .manifest("zsh", "# plugins\ngithub alice/dots\n")
        .build();

    let err = sync(
        &dir.global(false),
        &AppFilter::default(),
        &dir.git(),
        &RecordingLog::default(),
    )
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.ends_with("dotconf:2: 'github' entry is missing its target directory"), "{msg}");
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn dry_run_touches_nothing() {
    let dir = MainDirBuilder::new()
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("zsh", "github alice/dots dots\nfile zshrc\n")
        .store_file("zsh", "zshrc", "")
        .build();
    let git = dir.git();
    let log = RecordingLog::default();

    sync(&dir.global(true), &AppFilter::default(), &git, &log).unwrap();

    assert!(!dir.work_dir().exists());
    assert!(git.calls().is_empty());
    assert_eq!(log.statuses(), [SourceStatus::DryRun, SourceStatus::DryRun]);
}

#[test]
fn only_and_skip_select_applications() {
    let dir = MainDirBuilder::new()
        .manifest("git", "file gitconfig\n")
        .store_file("git", "gitconfig", "")
        .manifest("vim", "file vimrc\n")
        .store_file("vim", "vimrc", "")
        .build();

    let only = AppFilter {
        only: vec!["vim".to_string()],
        skip: vec![],
    };
    let log = RecordingLog::default();
    sync(&dir.global(false), &only, &dir.git(), &log).unwrap();
    assert_eq!(log.records().len(), 1);
    assert!(log.records()[0].0.starts_with("vim:"));

    let skip = AppFilter {
        only: vec![],
        skip: vec!["vim".to_string()],
    };
    let log = RecordingLog::default();
    sync(&dir.global(false), &skip, &dir.git(), &log).unwrap();
    assert_eq!(log.records().len(), 1);
    assert!(log.records()[0].0.starts_with("git:"));
}

#[test]
fn settings_change_cache_dir() {
    let dir = MainDirBuilder::new()
        .settings("cache_dir = \"mirrors\"\n")
        .remote("alice/dots", &[("a.sh", "")])
        .manifest("zsh", "github alice/dots dots\n")
        .build();

    sync(&dir.global(false), &AppFilter::default(), &dir.git(), &RecordingLog::default())
        .unwrap();

    assert!(dir.main_dir().join("mirrors/alice/dots").is_dir());
    assert!(!dir.main_dir().join(".repo").exists());
}
