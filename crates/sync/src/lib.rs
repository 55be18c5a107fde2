//! The synchronisation engine.
//!
//! One author sync is a straight line: canonicalise the URL, fetch the
//! page, extract groups and works, diff them against the stored state
//! and apply the resulting [`Difference`] to the store. Nothing here
//! retains state across calls — the [`Agent`] façade owns the store and
//! the fetcher, the differ and applier borrow them for the duration of
//! one sync.

mod agent;
mod applier;
mod builder;
mod clock;
mod diff;
mod differ;
mod engine;
pub mod error;
mod flags;
mod registry;
mod url;

pub use crate::agent::Agent;
pub use crate::applier::apply;
pub use crate::builder::{BuiltGroup, StoredGroupBuilder, StoredWorkBuilder};
pub use crate::diff::{Changes, Difference, GroupRef, Removed, WorkChange};
pub use crate::differ::collect_updates;
pub use crate::engine::{sync_all, sync_author};
pub use crate::registry::{StoredGroupRegistry, StoredWorkRegistry};
pub use crate::url::canonical_author_url;
