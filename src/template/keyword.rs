//! Keyword queries: the parsed content of a `${...}` reference.

/// What a keyword reference asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Files supplied by a remote-repository source.
    RepoFile,
}

impl Keyword {
    /// Tags accepted for [`Keyword::RepoFile`].
    pub const REPO_FILE_TAGS: [&'static str; 2] = ["github_file", "repository file"];

    /// Map a reference tag to its keyword; unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::REPO_FILE_TAGS
            .contains(&tag)
            .then_some(Self::RepoFile)
    }
}

/// A tag plus the glob alternatives that follow it.
///
/// `github_file:*.sh:*.zsh` parses into [`Keyword::RepoFile`] with
/// alternatives `["*.sh", "*.zsh"]`. Alternatives are kept verbatim, empty
/// ones included.
///
/// ```
/// use mydot::template::{Keyword, KeywordQuery};
///
/// let q = KeywordQuery::parse("github_file:*.sh:*.zsh").unwrap();
/// assert_eq!(q.keyword, Keyword::RepoFile);
/// assert_eq!(q.alternatives, ["*.sh", "*.zsh"]);
/// assert!(KeywordQuery::parse("svn_file:*").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    /// Requested keyword.
    pub keyword: Keyword,
    /// Glob patterns tried in order.
    pub alternatives: Vec<String>,
}

impl KeywordQuery {
    /// Parse the text between `${` and `}`.
    ///
    /// Returns `None` when the tag is not a known keyword.
    #[must_use]
    pub fn parse(inner: &str) -> Option<Self> {
        let mut parts = inner.split(':');
        let keyword = Keyword::from_tag(parts.next()?)?;
        Some(Self {
            keyword,
            alternatives: parts.map(String::from).collect(),
        })
    }
}
