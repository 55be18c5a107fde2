//! In-memory indexes over one author's stored rows.
//!
//! Both registries share a shape: a lookup keyed by the diff key (work
//! link, trimmed group name) and a set of ids seen during the scrape.
//! Whatever remains unseen after the scrape is abandoned and gets
//! removed by the applier.

use samlib_extract::{ParsedGroup, ParsedWork, trim_noise};
use samlib_store::{AuthorRow, GroupRow, WorkRow};
use std::collections::{HashMap, HashSet};

use crate::diff::GroupRef;

/// The stored link a parsed work maps to: the author URL tail glued to
/// the work's own path.
pub(crate) fn db_link(author: &AuthorRow, work: &ParsedWork) -> String {
    let tail = author.url.strip_prefix('/').unwrap_or(&author.url);
    format!("{tail}{}", work.url)
}

/// Index over the author's stored works.
pub struct StoredWorkRegistry<'a> {
    author: &'a AuthorRow,
    stored: Vec<WorkRow>,
    by_link: HashMap<String, usize>,
    seen: HashSet<i64>,
}

impl<'a> StoredWorkRegistry<'a> {
    pub fn new(author: &'a AuthorRow, stored: Vec<WorkRow>) -> Self {
        let by_link = stored.iter().enumerate().map(|(index, row)| (row.link.clone(), index)).collect();
        Self { author, stored, by_link, seen: HashSet::new() }
    }

    fn lookup(&self, work: &ParsedWork) -> Option<&WorkRow> {
        self.by_link.get(&db_link(self.author, work)).map(|&index| &self.stored[index])
    }

    /// The parsed work has no stored counterpart.
    pub fn is_new(&self, work: &ParsedWork) -> bool {
        self.lookup(work).is_none()
    }

    /// The stored counterpart changed size. Marks the work as seen.
    pub fn is_updated(&mut self, work: &ParsedWork) -> bool {
        match self.by_link.get(&db_link(self.author, work)) {
            Some(&index) => {
                let stored = &self.stored[index];
                self.seen.insert(stored.id);
                stored.size != work.size
            }
            None => false,
        }
    }

    /// The stored counterpart sits in a different group. Marks the work
    /// as seen.
    pub fn is_moved(&mut self, work: &ParsedWork, group: GroupRef) -> bool {
        match self.by_link.get(&db_link(self.author, work)) {
            Some(&index) => {
                let stored = &self.stored[index];
                self.seen.insert(stored.id);
                match group {
                    GroupRef::Persistent(id) => stored.group_id != id,
                    // A freshly built group has no id yet, so a known
                    // work under it has necessarily moved.
                    GroupRef::Pending(_) => true,
                }
            }
            None => false,
        }
    }

    /// The stored counterpart of a recognised work.
    pub fn get(&self, work: &ParsedWork) -> Option<&WorkRow> {
        self.lookup(work)
    }

    /// Stored works no scrape pass recognised, in stored order.
    pub fn abandoned(&self) -> Vec<WorkRow> {
        self.stored.iter().filter(|row| !self.seen.contains(&row.id)).cloned().collect()
    }
}

/// Index over the author's stored groups, keyed by trimmed name.
pub struct StoredGroupRegistry {
    stored: Vec<GroupRow>,
    by_name: HashMap<String, usize>,
    seen: HashSet<i64>,
}

impl StoredGroupRegistry {
    pub fn new(stored: Vec<GroupRow>) -> Self {
        let by_name = stored.iter().enumerate().map(|(index, row)| (trim_noise(&row.name), index)).collect();
        Self { stored, by_name, seen: HashSet::new() }
    }

    /// The parsed group has no stored counterpart. A hit marks the
    /// stored group as seen, so repeated calls stay consistent.
    pub fn is_new(&mut self, group: &ParsedGroup) -> bool {
        match self.by_name.get(group.name.as_str()) {
            Some(&index) => {
                self.seen.insert(self.stored[index].id);
                false
            }
            None => true,
        }
    }

    /// The stored counterpart of a recognised group.
    pub fn get(&self, group: &ParsedGroup) -> Option<&GroupRow> {
        self.by_name.get(group.name.as_str()).map(|&index| &self.stored[index])
    }

    /// Stored groups the scrape never mentioned, in stored order.
    pub fn abandoned(&self) -> Vec<GroupRow> {
        self.stored.iter().filter(|row| !self.seen.contains(&row.id)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> AuthorRow {
        AuthorRow { id: 1, url: "/s/sedrik/".to_owned(), name: "Седрик".to_owned(), ..AuthorRow::default() }
    }

    fn stored_work(id: i64, link: &str, size: i64, group_id: i64) -> WorkRow {
        WorkRow { id, link: link.to_owned(), size, group_id, author_id: 1, ..WorkRow::default() }
    }

    fn parsed(url: &str, size: i64) -> ParsedWork {
        ParsedWork { url: url.to_owned(), size, ..ParsedWork::default() }
    }

    #[test]
    fn test_work_link_derivation() {
        assert_eq!(db_link(&author(), &parsed("text_0010", 10)), "s/sedrik/text_0010");
    }

    #[test]
    fn test_unknown_work_is_new() {
        let author = author();
        let registry = StoredWorkRegistry::new(&author, vec![]);
        assert!(registry.is_new(&parsed("text_0010", 10)));
    }

    #[test]
    fn test_size_change_is_update() {
        let author = author();
        let mut registry = StoredWorkRegistry::new(&author, vec![stored_work(5, "s/sedrik/text_0010", 10, 2)]);
        let web = parsed("text_0010", 12);
        assert!(!registry.is_new(&web));
        assert!(registry.is_updated(&web));
        assert!(!registry.is_updated(&parsed("text_0010", 10)));
    }

    #[test]
    fn test_group_change_is_move() {
        let author = author();
        let mut registry = StoredWorkRegistry::new(&author, vec![stored_work(5, "s/sedrik/text_0010", 10, 2)]);
        let web = parsed("text_0010", 10);
        assert!(!registry.is_moved(&web, GroupRef::Persistent(2)));
        assert!(registry.is_moved(&web, GroupRef::Persistent(3)));
        assert!(registry.is_moved(&web, GroupRef::Pending(1)));
    }

    #[test]
    fn test_unseen_works_are_abandoned() {
        let author = author();
        let rows = vec![stored_work(5, "s/sedrik/text_0010", 10, 2), stored_work(6, "s/sedrik/text_0020", 4, 2)];
        let mut registry = StoredWorkRegistry::new(&author, rows);
        registry.is_updated(&parsed("text_0010", 10));
        let abandoned = registry.abandoned();
        assert_eq!(abandoned.len(), 1);
        assert_eq!(abandoned[0].id, 6);
    }

    #[test]
    fn test_group_registry_marks_seen_on_hit() {
        let stored = GroupRow { id: 3, name: " Рассказы: ".to_owned(), ..GroupRow::default() };
        let mut registry = StoredGroupRegistry::new(vec![stored]);
        let web = ParsedGroup { name: "Рассказы".to_owned(), ..ParsedGroup::default() };
        assert!(!registry.is_new(&web));
        assert!(registry.abandoned().is_empty());
        let other = ParsedGroup { name: "Повести".to_owned(), ..ParsedGroup::default() };
        assert!(registry.is_new(&other));
    }
}
