//! Command: list applications and their declared sources.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::Path;

use super::CommandSetup;
use crate::cli::{AppFilter, GlobalOpts, ListOpts};
use crate::config::Manifest;
use crate::logging::Logger;
use crate::sources::ContentSource;

/// Machine-readable listing emitted by `list --json`.
#[derive(Debug, Serialize)]
struct Listing<'a> {
    main_dir: &'a Path,
    work_dir: &'a Path,
    apps: &'a [Manifest],
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if setup fails, a manifest cannot be parsed, or the
/// listing cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, &AppFilter::default(), log)?;
    let manifests = setup.load_manifests(|_| {})?;
    let output = if opts.json {
        render_json(&setup, &manifests)?
    } else {
        render_text(&manifests)
    };
    print!("{output}");
    Ok(())
}

/// One block per application: its name, then one indented line per source.
#[must_use]
pub fn render_text(manifests: &[Manifest]) -> String {
    let mut lines = Vec::new();
    for manifest in manifests {
        lines.push(manifest.app.clone());
        if manifest.sources().is_empty() {
            lines.push("  (no sources)".to_string());
        }
        lines.extend(
            manifest
                .sources()
                .iter()
                .map(|source| format!("  {:<8}  {}", source.schema(), source.description())),
        );
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Pretty-printed JSON document describing the directories and every
/// parsed source.
///
/// # Errors
///
/// Returns an error if a path is not valid UTF-8.
pub fn render_json(setup: &CommandSetup, manifests: &[Manifest]) -> Result<String> {
    let listing = Listing {
        main_dir: &setup.main_dir,
        work_dir: &setup.work_dir,
        apps: manifests,
    };
    let mut json = serde_json::to_string_pretty(&listing).context("serializing listing")?;
    json.push('\n');
    Ok(json)
}
