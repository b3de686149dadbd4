//! Template expansion.
//!
//! A template is copied line by line. A line whose trimmed text has the form
//! `$template(<body>)` is a *directive*: the body holds one keyword reference
//! `${<tag>:<alt>:<alt>...}`, and the directive is replaced by one copy of
//! the body per path the manifest's earlier sources supply for that keyword.
//!
//! ```text
//! $template(source ~/.zsh/${github_file:*.sh})
//!   ──▶ source ~/.zsh/plugins/a.sh
//!       source ~/.zsh/plugins/b.sh
//! ```
pub mod expander;
pub mod keyword;
pub mod pattern;

pub use expander::Expander;
pub use keyword::{Keyword, KeywordQuery};
pub use pattern::KeywordRef;
