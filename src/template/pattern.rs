//! Directive and keyword-reference recognition.
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$template\((.*)\)$").expect("directive regex"));

#[allow(clippy::expect_used)]
static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("keyword regex"));

/// Body of a directive line, or `None` for ordinary text.
///
/// Surrounding whitespace (including the line terminator) is ignored.
///
/// ```
/// use mydot::template::pattern::directive_body;
///
/// assert_eq!(directive_body("  $template(x ${github_file:*})\n"), Some("x ${github_file:*}"));
/// assert_eq!(directive_body("echo $template(x)"), None);
/// ```
#[must_use]
pub fn directive_body(line: &str) -> Option<&str> {
    DIRECTIVE
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A `${...}` reference located inside a directive body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRef<'a> {
    inner: &'a str,
    span: Range<usize>,
}

impl<'a> KeywordRef<'a> {
    /// Text between the braces, e.g. `github_file:*.sh`.
    #[must_use]
    pub const fn inner(&self) -> &'a str {
        self.inner
    }

    /// Byte range of the whole reference, braces included.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// `body` with this reference replaced by `replacement`.
    ///
    /// Other references in `body` are left as written.
    #[must_use]
    pub fn substitute(&self, body: &str, replacement: &str) -> String {
        let head = body.get(..self.span.start).unwrap_or_default();
        let tail = body.get(self.span.end..).unwrap_or_default();
        let mut out = String::with_capacity(head.len() + replacement.len() + tail.len());
        out.push_str(head);
        out.push_str(replacement);
        out.push_str(tail);
        out
    }
}

/// First keyword reference in `body`.
#[must_use]
pub fn first_keyword(body: &str) -> Option<KeywordRef<'_>> {
    let caps = KEYWORD.captures(body)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1)?;
    Some(KeywordRef {
        inner: inner.as_str(),
        span: whole.range(),
    })
}
