//! Command: validate manifests and their inputs without materializing.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{AppFilter, GlobalOpts};
use crate::config::manifest;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, SourceStatus};
use crate::sources::{ContentSource, FILES_DIR, Source};

/// Run the check command.
///
/// # Errors
///
/// Returns an error if setup fails or any problem is found.
pub fn run(global: &GlobalOpts, filter: &AppFilter, log: &Logger) -> Result<()> {
    let executor = SystemExecutor;
    let setup = CommandSetup::init(global, filter, log)?;

    log.stage("Checking manifests");
    let problems = check(&setup, &executor, log);
    log.print_summary();

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found");
    }
    log.info("all manifests are valid");
    Ok(())
}

/// Check every selected application and return the number of problems.
///
/// Unlike `sync`, a broken manifest does not stop the check: every
/// application is visited and every problem logged.
pub fn check(setup: &CommandSetup, executor: &dyn Executor, log: &dyn Log) -> usize {
    let mut problems = 0;
    let mut needs_git = false;

    for app in &setup.apps {
        let manifest = match manifest::load(&setup.main_dir, app) {
            Ok(manifest) => manifest,
            Err(err) => {
                log.error(&err.to_string());
                log.record(app, SourceStatus::Failed, Some("manifest"));
                problems += 1;
                continue;
            }
        };

        let files_dir = setup.main_dir.join(app).join(FILES_DIR);
        let mut missing = 0;
        for source in manifest.sources() {
            let input = match source {
                Source::Github(_) => {
                    needs_git = true;
                    continue;
                }
                Source::File(s) => s.file(),
                Source::Template(s) => s.file(),
            };
            let path = files_dir.join(input);
            if !path.exists() {
                log.error(&format!(
                    "{app}: {} {}: input not found: {}",
                    source.schema(),
                    source.description(),
                    path.display()
                ));
                missing += 1;
            }
        }

        if missing > 0 {
            log.record(
                app,
                SourceStatus::Failed,
                Some(&format!("{missing} missing input(s)")),
            );
            problems += missing;
        } else {
            log.debug(&format!("{app}: {} sources ok", manifest.sources().len()));
            log.record(app, SourceStatus::Ok, None);
        }
    }

    if needs_git && !executor.which("git") {
        log.error("git is required by a github source but was not found on PATH");
        problems += 1;
    }
    problems
}
