//! Generic table accessor.

use exn::ResultExt;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::predicate::{Set, Where};
use crate::query;

/// A persisted entity kind.
///
/// The associated constants carry everything the generic accessor needs
/// to render SQL for the kind: the table name, the column other tables
/// use to reference it, the kind-specific "has unread content" fragment
/// and the insertable column list (everything except `_id`).
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const FK_COLUMN: &'static str;
    const NEW_SQL: &'static str;
    const INSERT_COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    /// Bind the insertable columns in `INSERT_COLUMNS` order.
    fn bind_insert<'q>(&'q self, query: Query<'q, Sqlite, SqliteArguments<'q>>) -> Query<'q, Sqlite, SqliteArguments<'q>>;
}

/// Pool-backed CRUD over one [`Entity`] table.
///
/// Single-row operations run in auto-commit mode; the batch operations
/// wrap their statements in one transaction and roll back on the first
/// failure. For transactions spanning several tables, use
/// [`Database::begin`] together with the functions in [`query`].
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    pool: SqlitePool,
    _entity: PhantomData<E>,
}

impl<E: Entity> From<&Database> for Table<E> {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}

impl<E: Entity> Table<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, _entity: PhantomData }
    }

    /// Fetch every row matching the filter, fully materialised.
    pub async fn retrieve(&self, filter: &Where, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<E>> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::retrieve(&mut conn, filter, limit, offset).await
    }

    /// Fetch every row of the table.
    pub async fn all(&self) -> Result<Vec<E>> {
        self.retrieve(&Where::any(), None, None).await
    }

    /// Fetch a row by primary key, [`ErrorKind::NotFound`] when absent.
    pub async fn get(&self, id: i64) -> Result<E> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::get(&mut conn, id).await
    }

    /// Fetch the single row matching the filter, [`ErrorKind::NotFound`]
    /// when nothing matches.
    pub async fn find(&self, filter: &Where) -> Result<E> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::find(&mut conn, filter).await
    }

    /// Insert one row and return it with the assigned primary key.
    pub async fn add(&self, row: &E) -> Result<E> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::add(&mut conn, row).await
    }

    /// Insert the rows inside one transaction.
    ///
    /// Returns a map from each row's pre-insert id (the sync engine's
    /// tentative ids land here) to the persisted row. Rolls back the
    /// whole batch when any insert fails.
    pub async fn add_batch(&self, rows: &[E]) -> Result<HashMap<i64, E>> {
        let mut inserted = HashMap::with_capacity(rows.len());
        if rows.is_empty() {
            return Ok(inserted);
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for row in rows {
            inserted.insert(row.id(), query::add(&mut tx, row).await?);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(inserted)
    }

    /// Rewrite every mapped column of the row identified by its id.
    pub async fn update(&self, row: &E) -> Result<()> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::update(&mut conn, row).await
    }

    /// Update the rows inside one transaction, rolling back on the first
    /// failure.
    pub async fn update_batch(&self, rows: &[E]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for row in rows {
            query::update(&mut tx, row).await?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)
    }

    /// Apply the given assignments to every row matching the filter.
    pub async fn update_where(&self, filter: &Where, sets: &[Set]) -> Result<()> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::update_where::<E>(&mut conn, filter, sets).await
    }

    /// Delete one row by primary key.
    pub async fn remove(&self, row: &E) -> Result<()> {
        self.remove_batch(std::slice::from_ref(row)).await
    }

    /// Delete the given rows by primary key.
    pub async fn remove_batch(&self, rows: &[E]) -> Result<()> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::remove_batch(&mut conn, rows).await
    }

    /// Delete every row matching the filter (nothing for an empty filter).
    pub async fn remove_where(&self, filter: &Where) -> Result<()> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::remove_where::<E>(&mut conn, filter).await
    }

    /// Count the rows matching the filter.
    pub async fn count(&self, filter: &Where) -> Result<u64> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::count::<E>(&mut conn, filter).await
    }

    /// Whether any row matches the filter.
    pub async fn exists(&self, filter: &Where) -> Result<bool> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        query::exists::<E>(&mut conn, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorRow, GroupRow, WorkRow};
    use std::ops::Deref;

    async fn database() -> Database {
        Database::connect_in_memory().await.unwrap()
    }

    fn author(url: &str) -> AuthorRow {
        AuthorRow {
            name: "Седрик".to_owned(),
            url: url.to_owned(),
            is_new: false,
            mtime: 1_700_000_000_000,
            ..AuthorRow::default()
        }
    }

    fn group(author_id: i64, name: &str) -> GroupRow {
        GroupRow {
            author_id,
            name: name.to_owned(),
            display_name: name.to_owned(),
            ..GroupRow::default()
        }
    }

    fn work(author_id: i64, group_id: i64, link: &str, size: i64) -> WorkRow {
        WorkRow {
            link: link.to_owned(),
            author: "Седрик".to_owned(),
            title: "Дорога домой".to_owned(),
            size,
            group_id,
            author_id,
            date: 1_700_000_000_000,
            mtime: 1_700_000_000_000,
            delta_size: size,
            is_new: true,
            ..WorkRow::default()
        }
    }

    #[tokio::test]
    async fn test_add_get_roundtrip() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let inserted = authors.add(&author("/s/sedrik/")).await.unwrap();
        assert!(inserted.id > 0);
        let fetched = authors.get(inserted.id).await.unwrap();
        assert_eq!(fetched, inserted);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let err = authors.get(9000).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::NotFound("Author")));
    }

    #[tokio::test]
    async fn test_add_batch_maps_tentative_ids() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let a = authors.add(&author("/s/sedrik/")).await.unwrap();
        let groups = Table::<GroupRow>::from(&db);
        let mut first = group(a.id, "Рассказы");
        first.id = -1;
        let mut second = group(a.id, "Повести");
        second.id = -2;
        let map = groups.add_batch(&[first, second]).await.unwrap();
        assert_eq!(map.len(), 2);
        assert!(map[&-1].id > 0);
        assert!(map[&-2].id > map[&-1].id);
        assert_eq!(map[&-1].name, "Рассказы");
    }

    #[tokio::test]
    async fn test_add_batch_rolls_back_on_failure() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        // Second row violates the URL uniqueness constraint.
        let result = authors.add_batch(&[author("/s/sedrik/"), author("/s/sedrik/")]).await;
        assert!(result.is_err());
        assert_eq!(authors.count(&Where::any()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_where_and_filters() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let groups = Table::<GroupRow>::from(&db);
        let works = Table::<WorkRow>::from(&db);
        let a = authors.add(&author("/s/sedrik/")).await.unwrap();
        let g = groups.add(&group(a.id, "Рассказы")).await.unwrap();
        works.add(&work(a.id, g.id, "s/sedrik/one", 10)).await.unwrap();
        works.add(&work(a.id, g.id, "s/sedrik/two", 5)).await.unwrap();

        let unread = Where::owned_by::<AuthorRow>(a.id).and(Where::is_new::<WorkRow>());
        assert_eq!(works.count(&unread).await.unwrap(), 2);

        works
            .update_where(&Where::owned_by::<GroupRow>(g.id), &[Set::new("ISNEW", false), Set::new("DELTA_SIZE", 0)])
            .await
            .unwrap();
        assert_eq!(works.count(&unread).await.unwrap(), 0);
        assert!(!works.exists(&Where::is_new::<WorkRow>()).await.unwrap());
    }

    #[tokio::test]
    async fn test_disjunction_matches_either_operand_order() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let a = authors.add(&author("/s/sedrik/")).await.unwrap();
        let b = authors.add(&author("/b/bes/")).await.unwrap();
        let lhs = authors.retrieve(&Where::me(a.id).or(Where::me(b.id)), None, None).await.unwrap();
        let rhs = authors.retrieve(&Where::me(b.id).or(Where::me(a.id)), None, None).await.unwrap();
        assert_eq!(lhs, rhs);
        assert_eq!(lhs.len(), 2);
    }

    #[tokio::test]
    async fn test_retrieve_pagination() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        for n in 0..5 {
            authors.add(&author(&format!("/s/sedrik{n}/"))).await.unwrap();
        }
        let page = authors.retrieve(&Where::any(), Some(2), Some(2)).await.unwrap();
        assert_eq!(page.len(), 2);
        let tail = authors.retrieve(&Where::any(), None, Some(4)).await.unwrap();
        assert_eq!(tail.len(), 1);
    }

    #[tokio::test]
    async fn test_author_delete_cascades_to_descendants() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let groups = Table::<GroupRow>::from(&db);
        let works = Table::<WorkRow>::from(&db);
        let a = authors.add(&author("/s/sedrik/")).await.unwrap();
        let g = groups.add(&group(a.id, "Рассказы")).await.unwrap();
        works.add(&work(a.id, g.id, "s/sedrik/one", 10)).await.unwrap();

        authors.remove(&a).await.unwrap();
        assert_eq!(groups.count(&Where::any()).await.unwrap(), 0);
        assert_eq!(works.count(&Where::any()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rewrites_row() {
        let db = database().await;
        let authors = Table::<AuthorRow>::from(&db);
        let mut a = authors.add(&author("/s/sedrik/")).await.unwrap();
        a.is_new = true;
        a.mtime += 1000;
        authors.update(&a).await.unwrap();
        assert_eq!(authors.get(a.id).await.unwrap(), a);
    }
}
