use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use crate::table::Entity;

/// One tracked author page.
///
/// `url` is the site-relative path (always starting with `/`), unique
/// across the table and never rewritten after insert. `is_new` is raised
/// whenever a sync detects unread descendants and cleared by the
/// read-markers.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct AuthorRow {
    #[sqlx(rename = "_id")]
    pub id: i64,
    #[sqlx(rename = "NAME")]
    pub name: String,
    #[sqlx(rename = "URL")]
    pub url: String,
    #[sqlx(rename = "ISNEW")]
    pub is_new: bool,
    /// Milliseconds since the Unix epoch of the last successful sync.
    #[sqlx(rename = "MTIME")]
    pub mtime: i64,
    /// Free text carried for the UI, not interpreted here.
    #[sqlx(rename = "ALL_TAGS_NAME")]
    pub all_tags_name: String,
}

impl Entity for AuthorRow {
    const TABLE: &'static str = "Author";
    const FK_COLUMN: &'static str = "AUTHOR_ID";
    const NEW_SQL: &'static str = "ISNEW = 1";
    const INSERT_COLUMNS: &'static [&'static str] = &["NAME", "URL", "ISNEW", "MTIME", "ALL_TAGS_NAME"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn bind_insert<'q>(&'q self, query: Query<'q, Sqlite, SqliteArguments<'q>>) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.name.as_str())
            .bind(self.url.as_str())
            .bind(self.is_new)
            .bind(self.mtime)
            .bind(self.all_tags_name.as_str())
    }
}
