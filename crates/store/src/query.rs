//! Executor-scoped query functions.
//!
//! Everything here takes an explicit `&mut SqliteConnection`, so the same
//! building blocks serve both the pool-backed [`Table`](crate::Table)
//! methods and multi-table transactions started with
//! [`Database::begin`](crate::Database::begin). None of these functions
//! open or close transactions themselves.

use exn::ResultExt;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{FromRow, Sqlite};

use crate::error::{ErrorKind, Result};
use crate::predicate::{Arg, Set, Where};
use crate::table::Entity;

fn bind_filter<'q>(mut query: Query<'q, Sqlite, SqliteArguments<'q>>, args: &'q [Arg]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Arg::Int(value) => query.bind(*value),
            Arg::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

fn bind_filter_as<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    args: &'q [Arg],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    for arg in args {
        query = match arg {
            Arg::Int(value) => query.bind(*value),
            Arg::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

fn select_sql<E: Entity>(filter: &Where, limit: Option<u32>, offset: Option<u32>) -> String {
    let mut sql = format!("SELECT * FROM {}", E::TABLE);
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filter.sql());
    }
    match (limit, offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        // SQLite only accepts OFFSET after LIMIT; -1 means unbounded.
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
    sql
}

/// Fetch every row matching the filter, fully materialised.
pub async fn retrieve<E: Entity>(
    conn: &mut SqliteConnection,
    filter: &Where,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<Vec<E>> {
    let sql = select_sql::<E>(filter, limit, offset);
    bind_filter_as(sqlx::query_as::<_, E>(&sql), filter.args())
        .fetch_all(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Fetch the single row matching the filter.
pub async fn find<E: Entity>(conn: &mut SqliteConnection, filter: &Where) -> Result<E> {
    let rows = retrieve::<E>(conn, filter, Some(1), None).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(row),
        None => exn::bail!(ErrorKind::NotFound(E::TABLE)),
    }
}

/// Fetch a row by primary key.
pub async fn get<E: Entity>(conn: &mut SqliteConnection, id: i64) -> Result<E> {
    find::<E>(conn, &Where::me(id)).await
}

/// Insert one row and return it with the assigned primary key.
pub async fn add<E: Entity>(conn: &mut SqliteConnection, row: &E) -> Result<E> {
    let placeholders = vec!["?"; E::INSERT_COLUMNS.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::INSERT_COLUMNS.join(", "),
        placeholders,
    );
    let outcome = row
        .bind_insert(sqlx::query(&sql))
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    let mut inserted = row.clone();
    inserted.set_id(outcome.last_insert_rowid());
    Ok(inserted)
}

/// Rewrite every mapped column of the row identified by its primary key.
pub async fn update<E: Entity>(conn: &mut SqliteConnection, row: &E) -> Result<()> {
    let assignments = E::INSERT_COLUMNS.iter().map(|column| format!("{column} = ?")).collect::<Vec<_>>().join(", ");
    let sql = format!("UPDATE {} SET {} WHERE _id = ?", E::TABLE, assignments);
    row.bind_insert(sqlx::query(&sql))
        .bind(row.id())
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Apply the given assignments to every row matching the filter.
pub async fn update_where<E: Entity>(conn: &mut SqliteConnection, filter: &Where, sets: &[Set]) -> Result<()> {
    if sets.is_empty() {
        return Ok(());
    }
    let assignments = sets.iter().map(|set| format!("{} = ?", set.column)).collect::<Vec<_>>().join(", ");
    let mut sql = format!("UPDATE {} SET {}", E::TABLE, assignments);
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filter.sql());
    }
    let mut query = sqlx::query(&sql);
    for set in sets {
        query = match &set.value {
            Arg::Int(value) => query.bind(*value),
            Arg::Text(value) => query.bind(value.as_str()),
        };
    }
    bind_filter(query, filter.args()).execute(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Delete the given rows by primary key. A no-op for an empty slice.
pub async fn remove_batch<E: Entity>(conn: &mut SqliteConnection, rows: &[E]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; rows.len()].join(", ");
    let sql = format!("DELETE FROM {} WHERE _id IN ({})", E::TABLE, placeholders);
    let mut query = sqlx::query(&sql);
    for row in rows {
        query = query.bind(row.id());
    }
    query.execute(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Delete every row matching the filter.
///
/// An empty filter deletes nothing: wiping a table requires saying which
/// rows, there is no implicit "all".
pub async fn remove_where<E: Entity>(conn: &mut SqliteConnection, filter: &Where) -> Result<()> {
    if filter.is_empty() {
        return Ok(());
    }
    let sql = format!("DELETE FROM {} WHERE {}", E::TABLE, filter.sql());
    bind_filter(sqlx::query(&sql), filter.args()).execute(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Count the rows matching the filter.
pub async fn count<E: Entity>(conn: &mut SqliteConnection, filter: &Where) -> Result<u64> {
    let mut sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filter.sql());
    }
    let row: (i64,) = bind_filter_as(sqlx::query_as(&sql), filter.args())
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    u64::try_from(row.0).or_raise(|| ErrorKind::InvalidData)
}

/// Whether any row matches the filter. An empty filter matches nothing.
pub async fn exists<E: Entity>(conn: &mut SqliteConnection, filter: &Where) -> Result<bool> {
    if filter.is_empty() {
        return Ok(false);
    }
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE {})", E::TABLE, filter.sql());
    let row: (i64,) = bind_filter_as(sqlx::query_as(&sql), filter.args())
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(row.0 != 0)
}
