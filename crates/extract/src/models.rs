//! Structured output of the page extractor.

/// How a group enumerates its works.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupKind {
    /// Works are listed inline under the header.
    #[default]
    Plain,
    /// The header cross-references a sub-page that carries the listing.
    External,
}

/// One work as printed on a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedWork {
    /// Site-relative path without the `.shtml` suffix.
    pub url: String,
    pub title: String,
    /// Size in kilobytes as reported by the listing.
    pub size: i64,
    pub genre: String,
    pub description: String,
}

/// One section of an author page with its inline works.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGroup {
    pub kind: GroupKind,
    /// Sub-page path for extended groups, empty otherwise.
    pub url: String,
    pub name: String,
    pub works: Vec<ParsedWork>,
}

/// The author page header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAuthor {
    pub name: String,
    pub description: String,
}
