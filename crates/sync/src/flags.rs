//! Unread-state maintenance shared by the applier and the read-markers.
//!
//! Two equivalences are kept after every committed transaction: a
//! group's `NEW_NUMBER` equals the count of its unread works, and an
//! author is flagged unread exactly when an unread work of theirs
//! exists.

use exn::ResultExt;
use samlib_store::{AuthorRow, GroupRow, Set, Where, WorkRow, query};
use sqlx::sqlite::SqliteConnection;

use crate::error::{ErrorKind, Result};

/// Recompute `NEW_NUMBER` from the works actually in the group, which
/// keeps it non-negative by construction.
pub(crate) async fn recompute_group_counter(conn: &mut SqliteConnection, group_id: i64) -> Result<()> {
    let unread = query::count::<WorkRow>(conn, &Where::owned_by::<GroupRow>(group_id).and(Where::is_new::<WorkRow>()))
        .await
        .or_raise(|| ErrorKind::Store)?;
    query::update_where::<GroupRow>(conn, &Where::me(group_id), &[Set::new("NEW_NUMBER", unread as i64)])
        .await
        .or_raise(|| ErrorKind::Store)
}

/// Recompute the author's unread flag; returns the flag written.
pub(crate) async fn recompute_author_flag(conn: &mut SqliteConnection, author_id: i64) -> Result<bool> {
    let unread = query::count::<WorkRow>(conn, &Where::owned_by::<AuthorRow>(author_id).and(Where::is_new::<WorkRow>()))
        .await
        .or_raise(|| ErrorKind::Store)?;
    query::update_where::<AuthorRow>(conn, &Where::me(author_id), &[Set::new("ISNEW", unread > 0)])
        .await
        .or_raise(|| ErrorKind::Store)?;
    Ok(unread > 0)
}
