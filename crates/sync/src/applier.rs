//! Committing a [`Difference`] to the store.

use exn::ResultExt;
use samlib_store::{AuthorRow, Database, GroupRow, Set, Table, Where, WorkRow, query};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

use crate::clock::now_ms;
use crate::diff::{Difference, GroupRef, WorkChange};
use crate::error::{ErrorKind, Result};
use crate::flags::{recompute_author_flag, recompute_group_counter};

/// Replace pending group references with the ids the batch insert
/// produced. Updated works normally arrive with persistent references
/// already, but a pending one is resolved all the same.
fn resolve_references(changes: &[WorkChange], inserted: &HashMap<i64, GroupRow>) -> Result<Vec<WorkRow>> {
    changes
        .iter()
        .map(|change| {
            let mut row = change.row.clone();
            row.group_id = match change.group {
                GroupRef::Persistent(id) => id,
                GroupRef::Pending(_) => match inserted.get(&change.group.sentinel_id()) {
                    Some(group) => group.id,
                    None => exn::bail!(ErrorKind::Resolve),
                },
            };
            Ok(row)
        })
        .collect()
}

/// Commit the difference.
///
/// Groups are written before works so foreign keys resolve; the author
/// row is stamped last. Each batch is transactional on its own and a
/// failure stops the sequence, so a half-applied difference never makes
/// it past the failing step. The closing transaction settles the unread
/// bookkeeping: every touched group's counter and the author's flag are
/// recomputed from the works actually stored, together with the sync
/// timestamp. The page-removed branch removes the author and every
/// descendant in one transaction — either it all happens or the store
/// is left untouched.
#[instrument(skip_all, fields(author = %author.name))]
pub async fn apply(db: &Database, diff: &Difference, author: &mut AuthorRow) -> Result<()> {
    if diff.is_empty() {
        tracing::debug!("no changes to apply");
        return Ok(());
    }

    if diff.page_removed {
        let by_author = Where::author_is(author);
        let mut tx = db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<WorkRow>(&mut tx, &by_author).await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<GroupRow>(&mut tx, &by_author).await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<AuthorRow>(&mut tx, &Where::me(author.id)).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::debug!("all author data removed from the store");
        return Ok(());
    }

    let groups = Table::<GroupRow>::from(db);
    let works = Table::<WorkRow>::from(db);

    let inserted_groups = groups.add_batch(&diff.added.groups).await.or_raise(|| ErrorKind::Store)?;
    let added_works = resolve_references(&diff.added.works, &inserted_groups)?;
    let updated_works = resolve_references(&diff.updated.works, &inserted_groups)?;

    works.add_batch(&added_works).await.or_raise(|| ErrorKind::Store)?;
    groups.update_batch(&diff.updated.groups).await.or_raise(|| ErrorKind::Store)?;
    works.update_batch(&updated_works).await.or_raise(|| ErrorKind::Store)?;
    groups.remove_batch(&diff.removed.groups).await.or_raise(|| ErrorKind::Store)?;
    works.remove_batch(&diff.removed.works).await.or_raise(|| ErrorKind::Store)?;

    // Groups whose unread bookkeeping the batches may have skewed: the
    // ones just written, plus the ones that lost works, whether the
    // work was abandoned or moved elsewhere. Removed groups are gone
    // and need nothing.
    let mut affected = HashSet::new();
    affected.extend(inserted_groups.values().map(|group| group.id));
    affected.extend(diff.updated.groups.iter().map(|group| group.id));
    affected.extend(diff.removed.works.iter().map(|work| work.group_id).filter(|&id| id > 0));
    affected.extend(diff.updated.works.iter().filter_map(|change| change.moved_from).filter(|&id| id > 0));
    for group in &diff.removed.groups {
        affected.remove(&group.id);
    }

    let mut tx = db.begin().await.or_raise(|| ErrorKind::Store)?;
    for group_id in affected {
        recompute_group_counter(&mut tx, group_id).await?;
    }
    author.is_new = recompute_author_flag(&mut tx, author.id).await?;
    author.mtime = now_ms();
    query::update_where::<AuthorRow>(&mut tx, &Where::me(author.id), &[Set::new("MTIME", author.mtime)])
        .await
        .or_raise(|| ErrorKind::Store)?;
    tx.commit().await.or_raise(|| ErrorKind::Store)?;
    tracing::debug!("update marker settled on the author");
    Ok(())
}
