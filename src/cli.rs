//! Command-line interface definition.
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Top-level CLI entry point for the dotfile materializer.
#[derive(Parser, Debug)]
#[command(
    name = "mydot",
    about = "Materialize application dotfiles from manifests, repositories and templates",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Directory holding the application directories and the repository cache
    /// [env: MYDOT_MAIN_DIR] [default: current directory]
    #[arg(long, global = true, value_name = "DIR")]
    pub main_dir: Option<PathBuf>,

    /// Target directory to materialize into [default: from mydot.toml, else "target"]
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Preview what would be materialized without writing anything
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long = "no-progress", global = true, action = clap::ArgAction::SetFalse)]
    pub progress: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse every manifest and materialize its sources
    Sync(SyncOpts),
    /// List applications and their declared sources
    List(ListOpts),
    /// Validate manifests and their inputs without materializing
    Check(AppFilter),
    /// Print a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::List(_) => "list",
            Self::Check(_) => "check",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Application selection shared by `sync` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct AppFilter {
    /// Skip specific applications
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Process only specific applications
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

impl AppFilter {
    /// Whether `app` passes the filter. `--only` takes precedence over
    /// `--skip`; names match exactly.
    #[must_use]
    pub fn allows(&self, app: &str) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|o| o == app);
        }
        !self.skip.iter().any(|s| s == app)
    }
}

/// Options for the `sync` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Application selection.
    #[command(flatten)]
    pub filter: AppFilter,
}

/// Options for the `list` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ListOpts {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Options for the `completions` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
