//! Dotfile materializer.
//!
//! Every application directory under the main directory carries a `dotconf`
//! manifest declaring, in order, the content that makes up its dotfiles:
//! snapshots of remote repositories, plain files from the application's
//! `files/` store, and templates expanded against the repositories declared
//! before them. `mydot sync` materializes all of it into a target tree.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: settings, application discovery and manifest parsing
//! - **[`sources`]**: the content sources and how each is materialized
//! - **[`template`]**: directive recognition and line-by-line expansion
//! - **[`commands`]**: top-level subcommand orchestration (`sync`, `list`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod sources;
pub mod template;
