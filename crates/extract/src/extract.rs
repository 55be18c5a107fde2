//! Selection of works, groups and the author header from page text.

use exn::ResultExt;
use regex::Regex;
use tracing::instrument;

use crate::clean::{clean_text, trim_noise};
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{GroupKind, ParsedAuthor, ParsedGroup, ParsedWork};

/// The compiled patterns driving one extraction pass.
///
/// Capture-group indices are part of the contract and must be preserved
/// by overrides: work lines expose (url, title, size, genre,
/// description), group headers (sub-page url, name, inner fragment), the
/// author header (name, description).
#[derive(Debug, Clone)]
pub struct Patterns {
    work: Regex,
    group: Regex,
    author: Regex,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            work: consts::WORK_PATTERN.clone(),
            group: consts::GROUP_PATTERN.clone(),
            author: consts::AUTHOR_PATTERN.clone(),
        }
    }
}

impl Patterns {
    /// Compile caller overrides, falling back to the defaults for any
    /// pattern passed as `None`.
    pub fn custom(work: Option<&str>, group: Option<&str>, author: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            work: match work {
                Some(pattern) => Regex::new(pattern).or_raise(|| ErrorKind::Pattern("work"))?,
                None => defaults.work,
            },
            group: match group {
                Some(pattern) => Regex::new(pattern).or_raise(|| ErrorKind::Pattern("group"))?,
                None => defaults.group,
            },
            author: match author {
                Some(pattern) => Regex::new(pattern).or_raise(|| ErrorKind::Pattern("author"))?,
                None => defaults.author,
            },
        })
    }
}

/// Extract every recognisable work line from a page fragment, in
/// document order. Unrecognised markup contributes nothing.
#[instrument(level = "trace", skip_all, fields(fragment_size = fragment.len()))]
pub fn extract_works(fragment: &str, patterns: &Patterns) -> Vec<ParsedWork> {
    patterns
        .work
        .captures_iter(fragment)
        .map(|found| ParsedWork {
            url: found.get(1).map_or_else(String::new, |m| m.as_str().to_owned()),
            title: trim_noise(found.get(2).map_or("", |m| m.as_str())),
            size: found.get(3).map_or("", |m| m.as_str()).parse().unwrap_or(0),
            genre: trim_noise(found.get(4).map_or("", |m| m.as_str())),
            description: clean_text(found.get(5).map_or("", |m| m.as_str())),
        })
        .collect()
}

/// Extract the group sections of an author page, in document order,
/// each with the works listed inline under its header.
///
/// Extended groups carry the sub-page path in `url`; header links under
/// `/type` are site-wide category pages unrelated to the author and are
/// discarded to an empty string.
#[instrument(level = "trace", skip_all, fields(page_size = page.len()))]
pub fn extract_groups(page: &str, patterns: &Patterns) -> Vec<ParsedGroup> {
    patterns
        .group
        .captures_iter(page)
        .map(|found| {
            let url = found.get(1).map_or("", |m| m.as_str());
            ParsedGroup {
                kind: if url.is_empty() { GroupKind::Plain } else { GroupKind::External },
                name: trim_noise(found.get(2).map_or("", |m| m.as_str())),
                works: extract_works(found.get(3).map_or("", |m| m.as_str()), patterns),
                url: if url.starts_with("/type") { String::new() } else { url.to_owned() },
            }
        })
        .collect()
}

/// Extract the author header. An unrecognised page yields empty fields.
pub fn extract_author(page: &str, patterns: &Patterns) -> ParsedAuthor {
    match patterns.author.captures(page) {
        Some(found) => ParsedAuthor {
            name: trim_noise(found.get(1).map_or("", |m| m.as_str())),
            description: trim_noise(found.get(2).map_or("", |m| m.as_str())),
        },
        None => ParsedAuthor::default(),
    }
}
