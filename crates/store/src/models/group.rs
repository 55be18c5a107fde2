use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use crate::table::Entity;

/// A section on an author's page.
///
/// `name` is the diff key within one author; `new_number` counts the
/// unread works currently filed under the group. `is_hidden` is reserved
/// for the UI and never written by the sync engine.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct GroupRow {
    #[sqlx(rename = "_id")]
    pub id: i64,
    #[sqlx(rename = "AUTHOR_ID")]
    pub author_id: i64,
    #[sqlx(rename = "NAME")]
    pub name: String,
    #[sqlx(rename = "DISPLAY_NAME")]
    pub display_name: String,
    #[sqlx(rename = "NEW_NUMBER")]
    pub new_number: i64,
    #[sqlx(rename = "IS_HIDDEN")]
    pub is_hidden: bool,
}

impl Entity for GroupRow {
    const TABLE: &'static str = "GroupBook";
    const FK_COLUMN: &'static str = "GROUP_ID";
    const NEW_SQL: &'static str = "NEW_NUMBER > 0";
    const INSERT_COLUMNS: &'static [&'static str] = &["AUTHOR_ID", "NAME", "DISPLAY_NAME", "NEW_NUMBER", "IS_HIDDEN"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn bind_insert<'q>(&'q self, query: Query<'q, Sqlite, SqliteArguments<'q>>) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.author_id)
            .bind(self.name.as_str())
            .bind(self.display_name.as_str())
            .bind(self.new_number)
            .bind(self.is_hidden)
    }
}
