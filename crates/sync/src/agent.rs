//! The façade the front-end talks to.

use exn::ResultExt;
use samlib_extract::{Patterns, extract_author};
use samlib_net::{SiteFetcher, WorkFormat, WorkStorage, strip_domain, to_url};
use samlib_store::{AuthorRow, Database, GroupRow, Set, Table, Where, WorkRow, query};
use std::path::PathBuf;
use tracing::instrument;

use crate::clock::now_ms;
use crate::engine::{sync_all, sync_author};
use crate::error::{ErrorKind, Result};
use crate::flags::{recompute_author_flag, recompute_group_counter};
use crate::url::canonical_author_url;

/// Aggregates the store, the fetcher and the works store behind the
/// operations the CLI needs. The agent exclusively owns the store;
/// differ and applier borrow it per sync and keep no state of their own.
pub struct Agent<F: SiteFetcher> {
    db: Database,
    fetcher: F,
    storage: WorkStorage,
    patterns: Patterns,
}

impl<F: SiteFetcher> Agent<F> {
    pub fn new(db: Database, fetcher: F, storage: WorkStorage) -> Self {
        Self { db, fetcher, storage, patterns: Patterns::default() }
    }

    /// Open (creating and migrating as needed) the database at `db_path`
    /// and the works store under `storage_location`.
    pub async fn open(db_path: &str, storage_location: &str, fetcher: F) -> Result<Self> {
        let db = Database::connect(db_path).await.or_raise(|| ErrorKind::Store)?;
        let storage = WorkStorage::new(storage_location).or_raise(|| ErrorKind::Storage)?;
        Ok(Self::new(db, fetcher, storage))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn authors(&self) -> Table<AuthorRow> {
        Table::from(&self.db)
    }

    fn groups(&self) -> Table<GroupRow> {
        Table::from(&self.db)
    }

    fn works(&self) -> Table<WorkRow> {
        Table::from(&self.db)
    }

    /// Start tracking an author.
    ///
    /// The URL is canonicalised, the page fetched and its header parsed;
    /// the author is inserted unread-free and immediately synced, which
    /// raises the unread flag whenever the page lists anything. Both bad
    /// URLs and missing pages surface as errors. Adding an
    /// already-tracked URL refreshes and returns the stored author.
    #[instrument(skip(self))]
    pub async fn add_author(&self, url: &str) -> Result<AuthorRow> {
        let canonical = canonical_author_url(url)?;
        tracing::debug!(%canonical, "fetching the author page");
        let page = self.fetcher.get(&canonical).await.or_raise(|| ErrorKind::Fetch)?;
        let page = match page {
            Some(page) if !page.is_empty() => page,
            _ => exn::bail!(ErrorKind::AuthorNotFound(canonical)),
        };

        let site_relative = strip_domain(&canonical).to_owned();
        let authors = self.authors();
        let tracked = Where::url_is(&site_relative);
        let mut author = if authors.exists(&tracked).await.or_raise(|| ErrorKind::Store)? {
            tracing::warn!(url = %site_relative, "the author is already tracked");
            authors.find(&tracked).await.or_raise(|| ErrorKind::Store)?
        } else {
            let header = extract_author(&page, &self.patterns);
            let row = AuthorRow {
                name: header.name,
                url: site_relative,
                mtime: now_ms(),
                ..AuthorRow::default()
            };
            authors.add(&row).await.or_raise(|| ErrorKind::Store)?
        };

        sync_author(&self.db, &self.fetcher, &self.patterns, &mut author).await?;
        Ok(author)
    }

    /// Stop tracking an author: the row and every descendant go away in
    /// one transaction.
    #[instrument(skip(self))]
    pub async fn remove_author(&self, id: i64) -> Result<()> {
        let by_author = Where::owned_by::<AuthorRow>(id);
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<WorkRow>(&mut tx, &by_author).await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<GroupRow>(&mut tx, &by_author).await.or_raise(|| ErrorKind::Store)?;
        query::remove_where::<AuthorRow>(&mut tx, &Where::me(id)).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)
    }

    /// Sync every tracked author.
    pub async fn check_updates(&self) -> Result<()> {
        self.check_updates_with_progress(|_, _, _| {}).await
    }

    /// Sync every tracked author, reporting progress after each one.
    pub async fn check_updates_with_progress(&self, progress: impl FnMut(&AuthorRow, u64, u64)) -> Result<()> {
        sync_all(&self.db, &self.fetcher, &self.patterns, progress).await
    }

    pub async fn get_author(&self, id: i64) -> Result<AuthorRow> {
        self.authors().get(id).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_authors(&self, updates_only: bool) -> Result<Vec<AuthorRow>> {
        let filter = if updates_only { Where::is_new::<AuthorRow>() } else { Where::any() };
        self.authors().retrieve(&filter, None, None).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_group(&self, id: i64) -> Result<GroupRow> {
        self.groups().get(id).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_groups(&self, author_id: i64, updates_only: bool) -> Result<Vec<GroupRow>> {
        let mut filter = Where::owned_by::<AuthorRow>(author_id);
        if updates_only {
            filter = filter.and(Where::is_new::<GroupRow>());
        }
        self.groups().retrieve(&filter, None, None).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_work(&self, id: i64) -> Result<WorkRow> {
        self.works().get(id).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_works_by_author(&self, author_id: i64, updates_only: bool) -> Result<Vec<WorkRow>> {
        let mut filter = Where::owned_by::<AuthorRow>(author_id);
        if updates_only {
            filter = filter.and(Where::is_new::<WorkRow>());
        }
        self.works().retrieve(&filter, None, None).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_works_by_group(&self, group_id: i64, updates_only: bool) -> Result<Vec<WorkRow>> {
        let mut filter = Where::owned_by::<GroupRow>(group_id);
        if updates_only {
            filter = filter.and(Where::is_new::<WorkRow>());
        }
        self.works().retrieve(&filter, None, None).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn count_works_by_author(&self, author_id: i64, updates_only: bool) -> Result<u64> {
        let mut filter = Where::owned_by::<AuthorRow>(author_id);
        if updates_only {
            filter = filter.and(Where::is_new::<WorkRow>());
        }
        self.works().count(&filter).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn count_works_by_group(&self, group_id: i64, updates_only: bool) -> Result<u64> {
        let mut filter = Where::owned_by::<GroupRow>(group_id);
        if updates_only {
            filter = filter.and(Where::is_new::<WorkRow>());
        }
        self.works().count(&filter).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn count_groups(&self, author_id: i64, updates_only: bool) -> Result<u64> {
        let mut filter = Where::owned_by::<AuthorRow>(author_id);
        if updates_only {
            filter = filter.and(Where::is_new::<GroupRow>());
        }
        self.groups().count(&filter).await.or_raise(|| ErrorKind::Store)
    }

    /// Clear the unread state of the author and every descendant.
    #[instrument(skip(self))]
    pub async fn mark_author_read(&self, id: i64) -> Result<()> {
        let by_author = Where::owned_by::<AuthorRow>(id);
        let cleared = [Set::new("ISNEW", false), Set::new("DELTA_SIZE", 0_i64)];
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::update_where::<WorkRow>(&mut tx, &by_author, &cleared).await.or_raise(|| ErrorKind::Store)?;
        query::update_where::<GroupRow>(&mut tx, &by_author, &[Set::new("NEW_NUMBER", 0_i64)])
            .await
            .or_raise(|| ErrorKind::Store)?;
        query::update_where::<AuthorRow>(&mut tx, &Where::me(id), &[Set::new("ISNEW", false)])
            .await
            .or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)
    }

    /// Clear the unread state of one group's works and recompute the
    /// parent author's flag from whatever stays unread elsewhere.
    #[instrument(skip(self))]
    pub async fn mark_group_read(&self, id: i64) -> Result<()> {
        let group = self.groups().get(id).await.or_raise(|| ErrorKind::Store)?;
        let cleared = [Set::new("ISNEW", false), Set::new("DELTA_SIZE", 0_i64)];
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::update_where::<WorkRow>(&mut tx, &Where::owned_by::<GroupRow>(id), &cleared)
            .await
            .or_raise(|| ErrorKind::Store)?;
        query::update_where::<GroupRow>(&mut tx, &Where::me(id), &[Set::new("NEW_NUMBER", 0_i64)])
            .await
            .or_raise(|| ErrorKind::Store)?;
        recompute_author_flag(&mut tx, group.author_id).await?;
        tx.commit().await.or_raise(|| ErrorKind::Store)
    }

    /// Clear one work's unread state; the group counter and the author
    /// flag follow the remaining unread works.
    #[instrument(skip(self))]
    pub async fn mark_work_read(&self, id: i64) -> Result<()> {
        let work = self.works().get(id).await.or_raise(|| ErrorKind::Store)?;
        let cleared = [Set::new("ISNEW", false), Set::new("DELTA_SIZE", 0_i64)];
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::update_where::<WorkRow>(&mut tx, &Where::me(id), &cleared).await.or_raise(|| ErrorKind::Store)?;
        // Some authors keep works outside any group.
        if work.group_id > 0 {
            recompute_group_counter(&mut tx, work.group_id).await?;
        }
        recompute_author_flag(&mut tx, work.author_id).await?;
        tx.commit().await.or_raise(|| ErrorKind::Store)
    }

    /// Raise one work's unread state again, with the full size as the
    /// delta. Only works support this direction.
    #[instrument(skip(self))]
    pub async fn mark_work_unread(&self, id: i64) -> Result<()> {
        let work = self.works().get(id).await.or_raise(|| ErrorKind::Store)?;
        let raised = [Set::new("ISNEW", true), Set::new("DELTA_SIZE", work.size)];
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        query::update_where::<WorkRow>(&mut tx, &Where::me(id), &raised).await.or_raise(|| ErrorKind::Store)?;
        if work.group_id > 0 {
            recompute_group_counter(&mut tx, work.group_id).await?;
        }
        query::update_where::<AuthorRow>(&mut tx, &Where::me(work.author_id), &[Set::new("ISNEW", true)])
            .await
            .or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)
    }

    /// Download a work body into the works store and return its path.
    ///
    /// The compressed edition comes from the site's mobile mirror; when
    /// it is not available the markup snapshot is stored instead.
    #[instrument(skip(self))]
    pub async fn fetch_work(&self, id: i64, format: WorkFormat) -> Result<PathBuf> {
        let work = self.works().get(id).await.or_raise(|| ErrorKind::Store)?;
        if format == WorkFormat::Fb2 {
            let url = to_url(&["/mobile", &work.link, ".fb2.zip"]);
            let path = self.storage.ensure_path(&work.link, WorkFormat::Fb2).await.or_raise(|| ErrorKind::Storage)?;
            if self.fetcher.fetch_to_file(&url, &path).await.or_raise(|| ErrorKind::Fetch)? {
                return Ok(path);
            }
            tracing::warn!(title = %work.title, "no compressed edition offered, storing the markup snapshot");
        }
        let url = to_url(&[&work.link, ".shtml"]);
        let path = self.storage.ensure_path(&work.link, WorkFormat::Html).await.or_raise(|| ErrorKind::Storage)?;
        if self.fetcher.fetch_to_file(&url, &path).await.or_raise(|| ErrorKind::Fetch)? {
            return Ok(path);
        }
        exn::bail!(ErrorKind::Unavailable)
    }

    /// The already-downloaded copy of a work, if any.
    pub async fn local_path(&self, work: &WorkRow) -> Option<PathBuf> {
        self.storage.find_local(&work.link).await
    }
}
