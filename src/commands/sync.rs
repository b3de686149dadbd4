//! Command: materialize every source of every selected application.
//!
//! Applications are discovered, every manifest is parsed, then the sources
//! are materialized one at a time in manifest order. The first failure
//! aborts the run; the summary is printed either way.
use anyhow::Result;

use super::CommandSetup;
use super::version::version_string;
use crate::cli::{AppFilter, GlobalOpts, SyncOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, SourceStatus};
use crate::sources::{ContentSource, Materialized};

/// Share of the progress bar taken by application discovery.
const LIST_SHARE: f64 = 0.05;

/// Share of the progress bar spread across manifest parsing.
const PARSE_SHARE: f64 = 0.1;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if setup or parsing fails, or any source fails to
/// materialize.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Logger) -> Result<()> {
    let executor = SystemExecutor;
    log.info(&format!("mydot {}", version_string()));

    let result = sync(global, &opts.filter, &executor, log);
    if result.is_err() {
        log.abandon_progress();
    }
    log.print_summary();
    result
}

/// Discover, parse and materialize, reporting progress through `log`.
///
/// # Errors
///
/// Returns the first setup, parse or materialization error.
pub fn sync(
    global: &GlobalOpts,
    filter: &AppFilter,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<()> {
    log.progress(0.0);
    log.stage("Discovering applications");
    let setup = CommandSetup::init(global, filter, log)?;
    log.info(&format!(
        "{} applications in {}",
        setup.apps.len(),
        setup.main_dir.display()
    ));
    log.progress(LIST_SHARE);

    log.stage("Parsing manifests");
    let app_count = setup.apps.len();
    let mut parsed = 0;
    let manifests = setup.load_manifests(|manifest| {
        parsed += 1;
        log.debug(&format!(
            "{}: {} sources",
            manifest.app,
            manifest.sources().len()
        ));
        log.progress(LIST_SHARE + PARSE_SHARE * share(parsed, app_count));
    })?;
    let total: usize = manifests.iter().map(|m| m.sources().len()).sum();
    log.info(&format!("{total} sources declared"));

    if global.dry_run {
        log.stage("Materializing (dry run)");
    } else {
        log.stage("Materializing");
    }
    let ctx = setup.context(executor, log);
    let base = LIST_SHARE + PARSE_SHARE;
    let mut done = 0;
    for manifest in &manifests {
        for source in manifest.sources() {
            let _span = tracing::info_span!(
                "source",
                app = %manifest.app,
                schema = %source.schema()
            )
            .entered();
            let name = format!(
                "{}: {} {}",
                manifest.app,
                source.schema(),
                source.description()
            );
            if global.dry_run {
                log.dry_run(&format!("would materialize {name}"));
                log.record(&name, SourceStatus::DryRun, None);
            } else {
                log.debug(&format!("materializing {name}"));
                match source.materialize(&ctx, manifest.sources()) {
                    Ok(Materialized::Applied) => log.record(&name, SourceStatus::Ok, None),
                    Ok(Materialized::Skipped { reason }) => {
                        log.record(&name, SourceStatus::Skipped, Some(&reason));
                    }
                    Err(err) => {
                        let message = format!("{err:#}");
                        log.error(&format!("{name}: {message}"));
                        log.record(&name, SourceStatus::Failed, Some(&message));
                        return Err(err.context(format!("materializing {name}")));
                    }
                }
            }
            done += 1;
            log.progress((base + (1.0 - base) * share(done, total)).min(1.0));
        }
    }

    log.progress(1.0);
    Ok(())
}

/// `part / whole`, treating an empty whole as complete.
#[allow(clippy::cast_precision_loss)]
fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        1.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::logging::test_helpers::{Level, RecordingLog};
    use crate::sources::test_helpers::MockExecutor;
    use std::path::Path;

    struct Layout {
        tmp: tempfile::TempDir,
    }

    impl Layout {
        fn new() -> Self {
            Self {
                tmp: tempfile::tempdir().unwrap(),
            }
        }

        fn main_dir(&self) -> std::path::PathBuf {
            self.tmp.path().join("main")
        }

        fn work_dir(&self) -> std::path::PathBuf {
            self.tmp.path().join("work")
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.main_dir().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn global(&self, dry_run: bool) -> GlobalOpts {
            std::fs::create_dir_all(self.main_dir()).unwrap();
            GlobalOpts {
                main_dir: Some(self.main_dir()),
                work_dir: Some(self.work_dir()),
                dry_run,
                progress: false,
            }
        }
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn materializes_in_manifest_order() {
        let layout = Layout::new();
        layout.write("vim/dotconf", "file vimrc\ntemplate gvimrc.template\n");
        layout.write("vim/files/vimrc", "set nu\n");
        layout.write("vim/files/gvimrc.template", "set gui\n");
        let log = RecordingLog::default();

        sync(&layout.global(false), &AppFilter::default(), &MockExecutor::default(), &log)
            .unwrap();

        assert_eq!(read(&layout.work_dir().join("vimrc")), "set nu\n");
        assert_eq!(read(&layout.work_dir().join("gvimrc")), "set gui\n");
        let records = log.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(_, s)| *s == SourceStatus::Ok));
        assert!(records[0].0.starts_with("vim: file"));
        assert!(records[1].0.starts_with("vim: template"));
    }

    #[test]
    fn progress_is_monotonic_and_completes() {
        let layout = Layout::new();
        layout.write("a/dotconf", "file x\n");
        layout.write("a/files/x", "");
        layout.write("b/dotconf", "file y\n");
        layout.write("b/files/y", "");
        let log = RecordingLog::default();

        sync(&layout.global(false), &AppFilter::default(), &MockExecutor::default(), &log)
            .unwrap();

        let values = log.progress_values();
        assert_eq!(values.first().copied(), Some(0.0));
        assert_eq!(values.last().copied(), Some(1.0));
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
        assert!((values[1] - LIST_SHARE).abs() < 1e-9);
        assert!((values[3] - (LIST_SHARE + PARSE_SHARE)).abs() < 1e-9);
    }

    #[test]
    fn empty_main_dir_completes() {
        let layout = Layout::new();
        let log = RecordingLog::default();
        sync(&layout.global(false), &AppFilter::default(), &MockExecutor::default(), &log)
            .unwrap();
        assert_eq!(log.progress_values().last().copied(), Some(1.0));
        assert!(log.records().is_empty());
    }

    #[test]
    fn dry_run_writes_nothing_and_runs_no_git() {
        let layout = Layout::new();
        layout.write("zsh/dotconf", "github alice/dots dots\nfile zshrc\n");
        layout.write("zsh/files/zshrc", "");
        let log = RecordingLog::default();
        let executor = MockExecutor::default();

        sync(&layout.global(true), &AppFilter::default(), &executor, &log).unwrap();

        assert!(!layout.work_dir().exists());
        assert!(executor.calls().is_empty());
        assert_eq!(log.at(Level::DryRun).len(), 2);
        assert!(log.records().iter().all(|(_, s)| *s == SourceStatus::DryRun));
    }

    #[test]
    fn first_failure_aborts_the_run() {
        let layout = Layout::new();
        layout.write("a/dotconf", "file missing\nfile present\n");
        layout.write("a/files/present", "");
        let log = RecordingLog::default();

        let err = sync(&layout.global(false), &AppFilter::default(), &MockExecutor::default(), &log)
            .unwrap_err();

        assert!(format!("{err:#}").contains("source file not found"));
        assert_eq!(log.records(), [("a: file missing".to_string(), SourceStatus::Failed)]);
        assert!(!layout.work_dir().join("present").exists());
        assert_ne!(log.progress_values().last().copied(), Some(1.0));
    }

    #[test]
    fn construction_error_aborts_before_materializing() {
        let layout = Layout::new();
        layout.write("a/dotconf", "file x\n");
        layout.write("a/files/x", "");
        layout.write("b/dotconf", "template notes.txt\n");
        let log = RecordingLog::default();

        let err = sync(&layout.global(false), &AppFilter::default(), &MockExecutor::default(), &log)
            .unwrap_err();

        assert!(err.to_string().contains("notes.txt"));
        assert!(log.records().is_empty());
        assert!(!layout.work_dir().join("x").exists());
    }

    #[test]
    fn existing_checkout_is_skipped() {
        let layout = Layout::new();
        layout.write("zsh/dotconf", "github alice/dots ${repo}\n");
        std::fs::create_dir_all(layout.work_dir().join("alice/dots")).unwrap();
        let log = RecordingLog::default();
        let executor = MockExecutor::default();

        sync(&layout.global(false), &AppFilter::default(), &executor, &log).unwrap();

        assert!(executor.calls().is_empty());
        assert_eq!(log.records()[0].1, SourceStatus::Skipped);
    }

    #[test]
    fn share_handles_empty_whole() {
        assert!((share(0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((share(1, 4) - 0.25).abs() < f64::EPSILON);
    }
}
