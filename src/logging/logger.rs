//! Structured logger with dry-run awareness, progress bar and summary collection.
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, SourceEntry, SourceStatus};
use super::utils::{log_file_path, terminal_columns};

/// Steps in the progress bar; reported fractions are scaled to it.
const PROGRESS_STEPS: u64 = 1000;

/// Widest bar drawn, in cells, regardless of terminal width.
const MAX_BAR_WIDTH: usize = 60;

/// Columns taken by the brackets, percentage and padding around the bar.
const DECORATION_WIDTH: usize = 8;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/mydot/<command>.log` (default `~/.cache/mydot/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
///
/// The logger also owns the console progress bar: every message is emitted
/// with the bar suspended, so log lines never interleave with a half-drawn
/// bar.
pub struct Logger {
    entries: Mutex<Vec<SourceEntry>>,
    log_file: Option<PathBuf>,
    bar: ProgressBar,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("log_file", &self.log_file)
            .field("position", &self.bar.position())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a new logger with the progress bar disabled.
    ///
    /// Stores the log file path for display in the run summary.  The log file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber);
    /// this constructor does not write to the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
            bar: progress_bar(false),
        }
    }

    /// Enable or disable the console progress bar.
    #[must_use]
    pub fn with_progress(self, enabled: bool) -> Self {
        Self {
            bar: progress_bar(enabled),
            ..self
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries (test-only).
    #[cfg(test)]
    pub(crate) fn entries(&self) -> Vec<SourceEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Run `emit` with the progress bar temporarily erased.
    fn around_progress(&self, emit: impl FnOnce()) {
        self.bar.suspend(emit);
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        self.around_progress(|| tracing::error!("{msg}"));
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        self.around_progress(|| tracing::warn!("{msg}"));
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        self.around_progress(|| tracing::info!(target: STAGE_TARGET, "{msg}"));
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        self.around_progress(|| tracing::info!("{msg}"));
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        self.around_progress(|| tracing::debug!("{msg}"));
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        self.around_progress(|| tracing::info!(target: DRY_RUN_TARGET, "{msg}"));
    }

    /// Record a source result for the summary.
    pub fn record(&self, name: &str, status: SourceStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(SourceEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Advance the progress bar to `fraction`.
    ///
    /// The bar never moves backwards. Reaching `1.0` finishes it; later
    /// calls are ignored.
    pub fn progress(&self, fraction: f64) {
        if self.bar.is_finished() {
            return;
        }
        let position = to_steps(fraction).max(self.bar.position());
        if position >= PROGRESS_STEPS {
            self.bar.finish();
        } else {
            self.bar.set_position(position);
        }
    }

    /// Stop the bar where it is; later progress is ignored.
    ///
    /// Used when a run aborts part-way.
    pub fn abandon_progress(&self) {
        self.bar.abandon();
    }

    /// Count the number of failed sources.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == SourceStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded sources.
    pub fn print_summary(&self) {
        let entries = match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.status {
                SourceStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                SourceStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                SourceStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                SourceStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let total = ok + skipped + dry_run + failed;
        self.info(&format!(
            "{total} sources: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

/// The console bar, drawn on stdout, or a hidden one when `enabled` is false.
///
/// The bar is sized to the terminal, capped at [`MAX_BAR_WIDTH`] cells.
fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::with_draw_target(Some(PROGRESS_STEPS), ProgressDrawTarget::hidden());
    }
    let width = terminal_columns()
        .saturating_sub(DECORATION_WIDTH)
        .clamp(1, MAX_BAR_WIDTH);
    let style = ProgressStyle::with_template(&format!("[{{bar:{width}}}] {{percent}}%"))
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#-"));
    ProgressBar::with_draw_target(Some(PROGRESS_STEPS), ProgressDrawTarget::stdout())
        .with_style(style)
}

/// Scale `fraction` (clamped to `[0, 1]`, NaN as 0) to bar steps.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn to_steps(fraction: f64) -> u64 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * PROGRESS_STEPS as f64).round() as u64
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: SourceStatus, message: Option<&str>) {
        self.record(name, status, message);
    }

    fn progress(&self, fraction: f64) {
        self.progress(fraction);
    }
}
