use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use crate::table::Entity;

/// One listed writing of an author.
///
/// `link` is the site-relative path of the work, unique per author.
/// `date` is set at insert and never rewritten; `mtime` tracks the last
/// sync that saw the work. `delta_size` is the absolute size change of
/// the update that last raised `is_new` (for never-changed works it
/// equals the initial size).
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct WorkRow {
    #[sqlx(rename = "_id")]
    pub id: i64,
    #[sqlx(rename = "LINK")]
    pub link: String,
    /// Author display name, denormalised at insert time.
    #[sqlx(rename = "AUTHOR")]
    pub author: String,
    #[sqlx(rename = "TITLE")]
    pub title: String,
    /// Genre tag as printed on the listing.
    #[sqlx(rename = "FORM")]
    pub form: String,
    /// Size in kilobytes as reported by the site.
    #[sqlx(rename = "SIZE")]
    pub size: i64,
    #[sqlx(rename = "GROUP_ID")]
    pub group_id: i64,
    #[sqlx(rename = "DATE")]
    pub date: i64,
    #[sqlx(rename = "DESCRIPTION")]
    pub description: String,
    #[sqlx(rename = "AUTHOR_ID")]
    pub author_id: i64,
    #[sqlx(rename = "MTIME")]
    pub mtime: i64,
    #[sqlx(rename = "ISNEW")]
    pub is_new: bool,
    /// Reserved.
    #[sqlx(rename = "OPTS")]
    pub opts: i64,
    #[sqlx(rename = "DELTA_SIZE")]
    pub delta_size: i64,
}

impl Entity for WorkRow {
    const TABLE: &'static str = "Book";
    const FK_COLUMN: &'static str = "BOOK_ID";
    const NEW_SQL: &'static str = "ISNEW = 1";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "LINK",
        "AUTHOR",
        "TITLE",
        "FORM",
        "SIZE",
        "GROUP_ID",
        "DATE",
        "DESCRIPTION",
        "AUTHOR_ID",
        "MTIME",
        "ISNEW",
        "OPTS",
        "DELTA_SIZE",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn bind_insert<'q>(&'q self, query: Query<'q, Sqlite, SqliteArguments<'q>>) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.link.as_str())
            .bind(self.author.as_str())
            .bind(self.title.as_str())
            .bind(self.form.as_str())
            .bind(self.size)
            .bind(self.group_id)
            .bind(self.date)
            .bind(self.description.as_str())
            .bind(self.author_id)
            .bind(self.mtime)
            .bind(self.is_new)
            .bind(self.opts)
            .bind(self.delta_size)
    }
}
