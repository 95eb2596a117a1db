//! Extraction passes over a loaded listing page.
//!
//! Both passes are fault-isolated: a detached element is skipped, and a
//! listing that never shows up yields an empty result rather than an error.
//! Only unexpected driver failures reach the caller.

use crate::filter::LinkFilter;
use crate::results::{ItemLink, TitleRecord};
use crate::selectors::{ITEM_LINK, TITLE_ANCHOR, TITLE_ITEM, TITLE_LIST, TITLE_TAG};
use crate::session::{PageElement, PageSession, SessionError, SessionResult};
use std::collections::HashSet;
use std::time::Duration;

/// Poem links on the current page, deduplicated, in page order
pub async fn collect_links<S: PageSession>(
    session: &S,
    filter: &LinkFilter,
    timeout: Duration,
) -> SessionResult<Vec<ItemLink>> {
    let anchors = match session.wait_for_all(ITEM_LINK, timeout).await {
        Ok(anchors) => anchors,
        Err(SessionError::Timeout) => {
            ::log::warn!("Timeout while collecting links from page");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in anchors.iter() {
        let href = match read_href(anchor).await {
            Ok(Some(href)) => href,
            Ok(None) => continue,
            Err(SessionError::StaleElement) => {
                ::log::trace!("Skipping detached anchor");
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(link) = filter.accept(&href) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    ::log::debug!("Collected {} links from {} anchors", links.len(), anchors.len());
    Ok(links)
}

/// Resolved `href` property, falling back to the raw attribute
async fn read_href<E: PageElement>(anchor: &E) -> SessionResult<Option<String>> {
    match anchor.prop("href").await? {
        Some(href) if !href.is_empty() => Ok(Some(href)),
        _ => anchor.attr("href").await,
    }
}

/// Title and tags of every entry in the page's title list
pub async fn collect_titles<S: PageSession>(session: &S) -> SessionResult<Vec<TitleRecord>> {
    let list = match session.find(TITLE_LIST).await {
        Ok(list) => list,
        Err(e) if e.is_recoverable() => {
            ::log::warn!("Title list not found on page: {}", e);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let items = match list.find_all(TITLE_ITEM).await {
        Ok(items) => items,
        Err(e) if e.is_recoverable() => {
            ::log::warn!("Title list vanished while reading it: {}", e);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items.iter() {
        match read_title_item(item).await {
            Ok(record) => records.push(record),
            Err(e) if e.is_recoverable() => {
                ::log::trace!("Skipping title entry: {}", e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    ::log::debug!("Collected {} title records", records.len());
    Ok(records)
}

async fn read_title_item<E: PageElement>(item: &E) -> SessionResult<TitleRecord> {
    let title = item.find(TITLE_ANCHOR).await?.text().await?;

    let mut tags = Vec::new();
    for tag in item.find_all(TITLE_TAG).await? {
        if let Some(text) = tag.prop("textContent").await? {
            tags.push(text.trim().to_string());
        }
    }

    Ok(TitleRecord::new(title.trim().to_string(), tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{MockElement, MockSession, link, title_item};

    const WAIT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_collect_links_filters_and_dedups() {
        let session = MockSession::new().with_listing(
            vec![
                link("https://example.org/poems/1/ode"),
                link("https://example.org/poets/keats"),
                link("https://example.org/poems/1/ode#notes"),
                link("https://example.org/poems/2/elegy"),
            ],
            vec![],
        );

        let links = collect_links(&session, &LinkFilter::default(), WAIT)
            .await
            .unwrap();
        assert_eq!(
            links,
            vec![
                "https://example.org/poems/1/ode".to_string(),
                "https://example.org/poems/2/elegy".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_anchor_is_skipped() {
        let session = MockSession::new().with_listing(
            vec![
                link("https://example.org/poems/1").stale(),
                link("https://example.org/poems/2"),
            ],
            vec![],
        );

        let links = collect_links(&session, &LinkFilter::default(), WAIT)
            .await
            .unwrap();
        assert_eq!(links, vec!["https://example.org/poems/2".to_string()]);
    }

    #[tokio::test]
    async fn test_href_attribute_fallback() {
        let anchor = MockElement::new().with_attr("href", "https://example.org/poems/3");
        let session = MockSession::new().with_listing(vec![anchor], vec![]);

        let links = collect_links(&session, &LinkFilter::default(), WAIT)
            .await
            .unwrap();
        assert_eq!(links, vec!["https://example.org/poems/3".to_string()]);
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_links() {
        let session = MockSession::new().with_listing(vec![], vec![]);
        let links = collect_links(&session, &LinkFilter::default(), WAIT)
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_driver_error_propagates() {
        let session = MockSession::new()
            .with_listing(vec![link("https://example.org/poems/1")], vec![])
            .failing_listing(0);

        let result = collect_links(&session, &LinkFilter::default(), WAIT).await;
        assert!(matches!(result, Err(SessionError::Driver(_))));
    }

    #[tokio::test]
    async fn test_collect_titles() {
        let session = MockSession::new().with_listing(
            vec![],
            vec![
                title_item(" Sonnet 18 ", &["Sonnet", " Love "]),
                title_item("Stale", &[]).stale(),
                MockElement::new(),
                title_item("Ozymandias", &[]),
            ],
        );

        let titles = collect_titles(&session).await.unwrap();
        assert_eq!(
            titles,
            vec![
                TitleRecord::new(
                    "Sonnet 18".to_string(),
                    vec!["Sonnet".to_string(), "Love".to_string()]
                ),
                TitleRecord::new("Ozymandias".to_string(), vec![]),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_title_list_yields_empty() {
        let session =
            MockSession::new().with_bare_listing(vec![link("https://example.org/poems/1")]);
        let titles = collect_titles(&session).await.unwrap();
        assert!(titles.is_empty());
    }
}
