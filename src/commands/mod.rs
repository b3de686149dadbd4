//! Top-level subcommand orchestration.
pub mod check;
pub mod completions;
pub mod list;
pub mod sync;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::{AppFilter, GlobalOpts};
use crate::config::{self, Manifest, Settings, manifest};
use crate::exec::Executor;
use crate::logging::Log;
use crate::sources::Context;

/// Environment variable consulted for the main directory when `--main-dir`
/// is not given.
pub const MAIN_DIR_ENV: &str = "MYDOT_MAIN_DIR";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates directory resolution, settings loading and application
/// discovery so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical main directory.
    pub main_dir: PathBuf,
    /// Target tree, as given (relative paths resolve against the current
    /// directory).
    pub work_dir: PathBuf,
    /// Settings from `mydot.toml`.
    pub settings: Settings,
    /// Selected applications, in lexical order.
    pub apps: Vec<String>,
}

impl CommandSetup {
    /// Resolve directories, load settings and discover applications.
    ///
    /// # Errors
    ///
    /// Returns an error if the main directory does not exist, the settings
    /// file is invalid, or the main directory cannot be listed.
    pub fn init(global: &GlobalOpts, filter: &AppFilter, log: &dyn Log) -> Result<Self> {
        let main_dir = resolve_main_dir(global.main_dir.as_deref())?;
        log.debug(&format!("main dir: {}", main_dir.display()));

        let settings = Settings::load(&main_dir)
            .with_context(|| format!("loading settings from {}", main_dir.display()))?;
        let work_dir = global
            .work_dir
            .clone()
            .unwrap_or_else(|| settings.work_dir.clone());
        log.debug(&format!("work dir: {}", work_dir.display()));

        let apps: Vec<String> = config::discover_apps(&main_dir)?
            .into_iter()
            .filter(|app| filter.allows(app))
            .collect();
        for name in &filter.only {
            if !apps.contains(name) {
                log.warn(&format!("no application named '{name}'"));
            }
        }
        log.debug(&format!("{} applications: {}", apps.len(), apps.join(", ")));

        Ok(Self {
            main_dir,
            work_dir,
            settings,
            apps,
        })
    }

    /// Parse the manifest of every selected application, in order.
    ///
    /// `on_loaded` is called after each manifest is parsed.
    ///
    /// # Errors
    ///
    /// Returns the first manifest that cannot be read or parsed.
    pub fn load_manifests(&self, mut on_loaded: impl FnMut(&Manifest)) -> Result<Vec<Manifest>> {
        self.apps
            .iter()
            .map(|app| -> Result<Manifest> {
                let manifest = manifest::load(&self.main_dir, app)?;
                on_loaded(&manifest);
                Ok(manifest)
            })
            .collect()
    }

    /// Materialization context over this setup.
    #[must_use]
    pub fn context<'a>(&'a self, executor: &'a dyn Executor, log: &'a dyn Log) -> Context<'a> {
        Context {
            main_dir: &self.main_dir,
            work_dir: &self.work_dir,
            settings: &self.settings,
            executor,
            log,
        }
    }
}

/// Resolve the main directory from `--main-dir`, [`MAIN_DIR_ENV`], or the
/// current directory, in that order.
///
/// # Errors
///
/// Returns an error if the chosen directory does not exist.
pub fn resolve_main_dir(flag: Option<&Path>) -> Result<PathBuf> {
    let dir = match flag {
        Some(dir) => dir.to_path_buf(),
        None => match std::env::var_os(MAIN_DIR_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => std::env::current_dir().context("reading current directory")?,
        },
    };
    dunce::canonicalize(&dir)
        .with_context(|| format!("main directory {} does not exist", dir.display()))
}
