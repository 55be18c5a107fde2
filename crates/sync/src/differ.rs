//! Turning a remote author page into a [`Difference`].

use exn::ResultExt;
use samlib_extract::{Patterns, extract_groups, extract_works};
use samlib_net::{SiteFetcher, to_url};
use samlib_store::{AuthorRow, Database, GroupRow, Table, Where, WorkRow};
use tracing::instrument;

use crate::builder::{StoredGroupBuilder, StoredWorkBuilder};
use crate::diff::Difference;
use crate::error::{ErrorKind, Result};
use crate::registry::{StoredGroupRegistry, StoredWorkRegistry};

/// Scrape the author's page and diff it against the stored state.
///
/// Works and groups are classified in document order; whatever the
/// scrape never mentions ends up in `removed`. An absent or empty page
/// yields a page-removed difference, while transport failures on the
/// author page abort the sync without touching the store. Extended
/// groups whose sub-page cannot be fetched keep their inline works
/// only — partial data is accepted.
#[instrument(skip_all, fields(author = %author.name))]
pub async fn collect_updates(
    db: &Database,
    fetcher: &dyn SiteFetcher,
    patterns: &Patterns,
    author: &AuthorRow,
) -> Result<Difference> {
    tracing::debug!(url = %author.url, "fetching the author page");
    let page = fetcher.get(&to_url(&[&author.url])).await.or_raise(|| ErrorKind::Fetch)?;
    let page = match page {
        Some(page) if !page.is_empty() => page,
        _ => {
            tracing::warn!(url = %author.url, "the author page cannot be found");
            return Ok(Difference::removed_page());
        }
    };

    let by_author = Where::author_is(author);
    let stored_works = Table::<WorkRow>::from(db).retrieve(&by_author, None, None).await.or_raise(|| ErrorKind::Store)?;
    let stored_groups =
        Table::<GroupRow>::from(db).retrieve(&by_author, None, None).await.or_raise(|| ErrorKind::Store)?;
    tracing::debug!(works = stored_works.len(), groups = stored_groups.len(), "loaded stored state");

    let mut work_registry = StoredWorkRegistry::new(author, stored_works);
    let mut group_registry = StoredGroupRegistry::new(stored_groups);
    let mut group_builder = StoredGroupBuilder::new(author);
    let work_builder = StoredWorkBuilder::new(author);

    let mut web_groups = extract_groups(&page, patterns);
    tracing::debug!(groups = web_groups.len(), "extracted groups from the page");

    let mut diff = Difference::default();
    for web_group in &mut web_groups {
        if !web_group.url.is_empty() {
            let sub_url = to_url(&[&author.url, &web_group.url, ".shtml"]);
            match fetcher.get(&sub_url).await {
                Ok(Some(fragment)) if !fragment.is_empty() => {
                    web_group.works.extend(extract_works(&fragment, patterns));
                }
                Ok(_) => {
                    tracing::warn!(group = %web_group.name, "cannot get the extended group content, skipping");
                }
                Err(error) => {
                    tracing::warn!(group = %web_group.name, ?error, "extended group fetch failed, skipping");
                }
            }
        }

        let mut group = group_builder.build(&mut group_registry, web_group);
        for web_work in &web_group.works {
            if work_registry.is_new(web_work) {
                tracing::debug!(title = %web_work.title, "work is new");
                diff.added.works.push(work_builder.build_new(web_work, &mut group));
            } else if work_registry.is_updated(web_work) || work_registry.is_moved(web_work, group.reference) {
                tracing::debug!(title = %web_work.title, size = web_work.size, "work grew or moved");
                let stored = work_registry.get(web_work).cloned().unwrap_or_default();
                diff.updated.works.push(work_builder.build_updated(web_work, &stored, &mut group));
            }
        }

        if group_registry.is_new(web_group) {
            diff.added.groups.push(group.row);
        } else if group.row.new_number > 0 {
            diff.updated.groups.push(group.row);
        }
    }

    diff.removed.works = work_registry.abandoned();
    diff.removed.groups = group_registry.abandoned();

    if diff.is_empty() {
        tracing::info!("the author page has no changes");
    } else {
        tracing::info!(
            added_works = diff.added.works.len(),
            added_groups = diff.added.groups.len(),
            updated_works = diff.updated.works.len(),
            updated_groups = diff.updated.groups.len(),
            removed_works = diff.removed.works.len(),
            removed_groups = diff.removed.groups.len(),
            "changes detected on the author page",
        );
    }
    Ok(diff)
}
