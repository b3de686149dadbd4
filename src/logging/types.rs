//! Core logging types: per-source entries, status, and the [`Log`] trait.

/// Materialization result of one content source, for summary reporting.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Human-readable source name (`<app>: <description>`).
    pub name: String,
    /// Final status of the source.
    pub status: SourceStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Source was materialized.
    Ok,
    /// Source was left untouched because its output already exists.
    Skipped,
    /// Run in dry-run mode; nothing was written.
    DryRun,
    /// Materialization failed; the run is aborted after this entry.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the console/file implementation;
/// tests substitute a recording implementation so that diagnostics can be
/// asserted on.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a source result for the summary.
    fn record(&self, name: &str, status: SourceStatus, message: Option<&str>);
    /// Report overall run progress as a fraction in `[0, 1]`.
    ///
    /// Purely observational; the default implementation ignores it.
    fn progress(&self, _fraction: f64) {}
}
