//! Line-by-line template expansion against a list of sources.
use anyhow::{Context as _, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use super::keyword::KeywordQuery;
use super::pattern::{self, KeywordRef};
use crate::logging::Log;
use crate::sources::{ContentSource, Source};

/// Expands directive lines using the paths `siblings` supply.
///
/// `root` is the materialized tree the sibling sources were written into;
/// every path a sibling answers with is relative to it.
pub struct Expander<'a> {
    root: &'a Path,
    siblings: &'a [Source],
    log: &'a dyn Log,
}

impl std::fmt::Debug for Expander<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expander")
            .field("root", &self.root)
            .field("siblings", &self.siblings.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Expander<'a> {
    /// Create an expander over `siblings`, resolving paths under `root`.
    #[must_use]
    pub const fn new(root: &'a Path, siblings: &'a [Source], log: &'a dyn Log) -> Self {
        Self {
            root,
            siblings,
            log,
        }
    }

    /// Output lines for one input line.
    ///
    /// Ordinary lines come back unchanged, terminator included. A directive
    /// yields one line per supplied path, each ending in `\n`; a directive
    /// without a keyword reference yields nothing and logs a warning.
    #[must_use]
    pub fn process_line(&self, line: &str) -> Vec<String> {
        let Some(body) = pattern::directive_body(line) else {
            return vec![line.to_string()];
        };
        let Some(reference) = pattern::first_keyword(body) else {
            self.log
                .warn(&format!("no keyword in template directive: {body}"));
            return Vec::new();
        };
        self.fill(&reference, body)
    }

    /// Substitute every path the siblings supply for `reference` into `body`.
    ///
    /// Siblings are consulted in manifest order and their answers
    /// concatenated. Empty substitutions are dropped; every other line gets
    /// a trailing `\n`. An unrecognised tag yields nothing.
    #[must_use]
    pub fn fill(&self, reference: &KeywordRef<'_>, body: &str) -> Vec<String> {
        let Some(query) = KeywordQuery::parse(reference.inner()) else {
            return Vec::new();
        };
        self.siblings
            .iter()
            .flat_map(|source| source.answer_keyword(self.root, &query))
            .map(|path| reference.substitute(body, &path))
            .filter(|line| !line.is_empty())
            .map(|mut line| {
                line.push('\n');
                line
            })
            .collect()
    }

    /// Expand everything `reader` yields into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails, or the input is not
    /// valid UTF-8.
    pub fn expand(&self, mut reader: impl BufRead, writer: &mut impl Write) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .context("reading template input")?;
            if read == 0 {
                return Ok(());
            }
            for out in self.process_line(&line) {
                writer
                    .write_all(out.as_bytes())
                    .context("writing template output")?;
            }
        }
    }
}
