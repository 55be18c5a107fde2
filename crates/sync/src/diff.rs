//! The change set one sync emits.

use samlib_store::{GroupRow, WorkRow};

/// Reference to the group a changed work belongs to.
///
/// Groups first seen on this scrape have no row id yet; their works
/// carry a `Pending` tag that the applier resolves once the group batch
/// has been inserted. Persisted ids are non-negative by schema, pending
/// rows travel with the negated tag as a sentinel id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRef {
    /// An already-persisted group row.
    Persistent(i64),
    /// The n-th new group of this scrape, in document order from 1.
    Pending(u32),
}

impl GroupRef {
    /// The sentinel row id pending references travel under.
    pub fn sentinel_id(self) -> i64 {
        match self {
            Self::Persistent(id) => id,
            Self::Pending(tag) => -i64::from(tag),
        }
    }
}

/// A work row to insert or update, with the group it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkChange {
    pub row: WorkRow,
    pub group: GroupRef,
    /// The group the stored row sat in before this scrape, for updated
    /// works. A move leaves unread bookkeeping behind in this group.
    pub moved_from: Option<i64>,
}

/// Rows to insert or to rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    pub works: Vec<WorkChange>,
    pub groups: Vec<GroupRow>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.works.is_empty() && self.groups.is_empty()
    }
}

/// Stored rows whose keys did not appear in the latest scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removed {
    pub works: Vec<WorkRow>,
    pub groups: Vec<GroupRow>,
}

impl Removed {
    pub fn is_empty(&self) -> bool {
        self.works.is_empty() && self.groups.is_empty()
    }
}

/// Everything one scrape changed relative to the stored state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Difference {
    pub added: Changes,
    pub updated: Changes,
    pub removed: Removed,
    /// The author page itself is gone; the applier drops the author and
    /// every descendant.
    pub page_removed: bool,
}

impl Difference {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty() && !self.page_removed
    }

    pub(crate) fn removed_page() -> Self {
        Self { page_removed: true, ..Self::default() }
    }
}
