//! `mydot` command-line entry point.
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use mydot::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);

    let progress = args.global.progress && std::io::stdout().is_terminal();
    let log = logging::Logger::new(command).with_progress(progress);

    match &args.command {
        cli::Command::Sync(opts) => commands::sync::run(&args.global, opts, &log),
        cli::Command::List(opts) => commands::list::run(&args.global, opts, &log),
        cli::Command::Check(filter) => commands::check::run(&args.global, filter, &log),
        cli::Command::Completions(opts) => commands::completions::run(opts.shell),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
