//! Extraction of author pages into structured groups and works.
//!
//! The markup on the site is nowhere near well-formed XML, so the
//! extractor selects with regular expressions instead of a tree parser
//! and tolerates everything it does not recognise: unknown fragments
//! simply produce empty lists, never errors.
//!
//! The three entry points are pure functions over the page text:
//! [`extract_author`], [`extract_groups`] and [`extract_works`]. The
//! patterns driving them are configuration — [`Patterns::default`] is
//! the site defaults, [`Patterns::custom`] accepts caller overrides.

mod clean;
mod consts;
pub mod error;
mod extract;
mod models;

pub use crate::clean::{clean_text, trim_noise};
pub use crate::extract::{Patterns, extract_author, extract_groups, extract_works};
pub use crate::models::{GroupKind, ParsedAuthor, ParsedGroup, ParsedWork};
