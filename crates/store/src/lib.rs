//! SQLite persistence for tracked authors, groups and works.
//!
//! This crate is the local source of truth for everything the tracker has
//! seen on the site so far. Three entities are persisted:
//! - **Authors**: one row per tracked author page, keyed by the
//!   site-relative URL.
//! - **Groups**: the sections of an author's page, diff-keyed by name.
//! - **Works**: the listed writings, diff-keyed by site-relative link.
//!
//! # Architecture
//! Access goes through [`Table`], a generic accessor parameterised by the
//! [`Entity`] being queried, filtered by the composable [`Where`]
//! predicate type. Multi-table operations that must commit atomically
//! (author removal, read-marker maintenance, diff application) run the
//! executor-scoped functions in [`query`] inside a single transaction.

mod db;
pub mod error;
mod models;
mod predicate;
pub mod query;
mod table;

pub use crate::db::Database;
pub use crate::models::{AuthorRow, GroupRow, WorkRow};
pub use crate::predicate::{Arg, Set, Where};
pub use crate::table::{Entity, Table};
