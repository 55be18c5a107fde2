//! Shaping parsed page content into store rows.

use samlib_extract::{ParsedGroup, ParsedWork};
use samlib_store::{AuthorRow, GroupRow, WorkRow};

use crate::clock::now_ms;
use crate::diff::{GroupRef, WorkChange};
use crate::registry::{StoredGroupRegistry, db_link};

/// A group row shaped for this scrape, with the reference its works use.
#[derive(Debug, Clone)]
pub struct BuiltGroup {
    pub row: GroupRow,
    pub reference: GroupRef,
}

/// Assigns tentative references to the groups of one scrape.
pub struct StoredGroupBuilder<'a> {
    author: &'a AuthorRow,
    counter: u32,
}

impl<'a> StoredGroupBuilder<'a> {
    pub fn new(author: &'a AuthorRow) -> Self {
        Self { author, counter: 0 }
    }

    /// Shape the parsed group into a row. Known groups keep their stored
    /// id; new ones get the next pending tag and travel under the
    /// negated tag as a sentinel id, which the schema forbids for real
    /// rows. `new_number` starts at zero and is bumped by the work
    /// builder.
    pub fn build(&mut self, registry: &mut StoredGroupRegistry, web: &ParsedGroup) -> BuiltGroup {
        self.counter += 1;
        let mut row = GroupRow {
            author_id: self.author.id,
            name: web.name.clone(),
            display_name: web.name.clone(),
            ..GroupRow::default()
        };
        let reference = if registry.is_new(web) {
            GroupRef::Pending(self.counter)
        } else {
            // is_new() just recorded the stored row as seen, so the
            // lookup cannot miss.
            GroupRef::Persistent(registry.get(web).map(|stored| stored.id).unwrap_or_default())
        };
        row.id = reference.sentinel_id();
        BuiltGroup { row, reference }
    }
}

/// Shapes parsed works into insertable and updatable rows.
///
/// `now` is captured once at construction so every row of one sync
/// carries the same timestamp.
pub struct StoredWorkBuilder<'a> {
    author: &'a AuthorRow,
    now: i64,
}

impl<'a> StoredWorkBuilder<'a> {
    pub fn new(author: &'a AuthorRow) -> Self {
        Self { author, now: now_ms() }
    }

    fn shape(&self, web: &ParsedWork, group: &BuiltGroup) -> WorkRow {
        WorkRow {
            link: db_link(self.author, web),
            author: self.author.name.clone(),
            title: web.title.clone(),
            form: web.genre.clone(),
            size: web.size,
            group_id: group.row.id,
            description: web.description.clone(),
            author_id: self.author.id,
            ..WorkRow::default()
        }
    }

    /// A first-seen work: fresh timestamps, the whole size counts as
    /// the delta. Bumps the group's unread counter.
    pub fn build_new(&self, web: &ParsedWork, group: &mut BuiltGroup) -> WorkChange {
        let mut row = self.shape(web, group);
        row.date = self.now;
        row.mtime = self.now;
        row.delta_size = web.size;
        row.is_new = true;
        group.row.new_number += 1;
        WorkChange { row, group: group.reference, moved_from: None }
    }

    /// A grown or moved work: keeps the stored id and creation date,
    /// the delta is the absolute size change. Bumps the group's unread
    /// counter.
    pub fn build_updated(&self, web: &ParsedWork, stored: &WorkRow, group: &mut BuiltGroup) -> WorkChange {
        let mut row = self.shape(web, group);
        row.id = stored.id;
        row.date = stored.date;
        row.mtime = self.now;
        row.delta_size = (stored.size - web.size).abs();
        row.is_new = true;
        group.row.new_number += 1;
        WorkChange { row, group: group.reference, moved_from: Some(stored.group_id) }
    }
}
