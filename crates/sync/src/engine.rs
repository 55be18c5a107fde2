//! Author-level sync loops.

use exn::ResultExt;
use samlib_extract::Patterns;
use samlib_net::SiteFetcher;
use samlib_store::{AuthorRow, Database, Table, Where};
use tracing::instrument;

use crate::applier::apply;
use crate::differ::collect_updates;
use crate::error::{ErrorKind, Result};

/// Diff and commit one author. The row is refreshed in place when the
/// sync stamps it.
pub async fn sync_author(
    db: &Database,
    fetcher: &dyn SiteFetcher,
    patterns: &Patterns,
    author: &mut AuthorRow,
) -> Result<()> {
    let diff = collect_updates(db, fetcher, patterns, author).await?;
    apply(db, &diff, author).await
}

/// Sync every tracked author sequentially.
///
/// A failing author is logged and skipped — one unreachable page must
/// not starve the rest of the list. The progress callback fires after
/// each author with the 1-based position and the total count.
#[instrument(skip_all)]
pub async fn sync_all(
    db: &Database,
    fetcher: &dyn SiteFetcher,
    patterns: &Patterns,
    mut progress: impl FnMut(&AuthorRow, u64, u64),
) -> Result<()> {
    let authors = Table::<AuthorRow>::from(db);
    let total = authors.count(&Where::any()).await.or_raise(|| ErrorKind::Store)?;
    for (index, mut author) in
        authors.all().await.or_raise(|| ErrorKind::Store)?.into_iter().enumerate()
    {
        tracing::info!(author = %author.name, "checking updates");
        if let Err(error) = sync_author(db, fetcher, patterns, &mut author).await {
            tracing::warn!(author = %author.name, ?error, "sync failed, moving on to the next author");
        }
        progress(&author, index as u64 + 1, total);
    }
    Ok(())
}
