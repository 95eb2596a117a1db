use crate::HarvestError;
use crate::config::{HarvestConfig, RevealOptions};
use crate::crawlers::{extractor, harvester, paginator, revealer};
use crate::events::{EventLog, Phase};
use crate::filter::LinkFilter;
use crate::results::{CrawlState, ItemMetadata};
use crate::session::PageSession;
use crate::throttle::Throttle;
use std::time::Duration;

/// Outcome of the link collection phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCollectionSummary {
    /// Listing pages whose links and titles were merged into the state
    pub pages_visited: usize,

    /// Distinct poem links in the state after the phase
    pub unique_links: usize,

    /// Title records in the state after the phase
    pub titles: usize,

    /// Why the walk stopped early, if it did
    pub aborted: Option<String>,
}

/// Drives one page session through the listing walk and the metadata scrape
pub struct Crawler<S: PageSession> {
    session: S,
    throttle: Throttle,
    filter: LinkFilter,
    reveal: RevealOptions,
    element_timeout: Duration,
    next_page_settle: Duration,
    events: EventLog,
}

impl<S: PageSession> Crawler<S> {
    pub fn new(session: S, filter: LinkFilter, config: &HarvestConfig) -> Self {
        Self {
            session,
            throttle: Throttle::new(config.delay),
            filter,
            reveal: config.reveal,
            element_timeout: config.element_timeout(),
            next_page_settle: config.next_page_settle(),
            events: EventLog::new(),
        }
    }

    /// Report progress and failures to `events`
    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Give the session back, e.g. to close it
    pub fn into_session(self) -> S {
        self.session
    }

    /// Walks the listing from `start_url`, merging every page's links and
    /// titles into `state`.
    ///
    /// Stops after `max_pages` pages or when no next page is left. Any other
    /// failure ends the walk early; what was collected so far stays in `state`.
    pub async fn collect_links(
        &self,
        state: &mut CrawlState,
        start_url: &str,
        max_pages: Option<usize>,
    ) -> LinkCollectionSummary {
        let mut pages_visited = 0;
        let aborted = match self
            .walk_listing(state, start_url, max_pages, &mut pages_visited)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                let context = format!("page {}", state.current_page.max(1));
                self.events.error(
                    Phase::Links,
                    Some(context.as_str()),
                    format!("Error during link collection: {}", e),
                );
                Some(e.to_string())
            }
        };

        self.events.info(
            Phase::Links,
            format!(
                "Total unique poem links collected: {}",
                state.links().len()
            ),
        );

        LinkCollectionSummary {
            pages_visited,
            unique_links: state.links().len(),
            titles: state.titles().len(),
            aborted,
        }
    }

    async fn walk_listing(
        &self,
        state: &mut CrawlState,
        start_url: &str,
        max_pages: Option<usize>,
        pages_visited: &mut usize,
    ) -> Result<(), HarvestError> {
        state.current_page = 1;

        self.session
            .navigate(start_url)
            .await
            .map_err(|source| HarvestError::Navigation {
                url: start_url.to_string(),
                source,
            })?;
        self.events.info(
            Phase::Links,
            format!("Starting link collection at: {}", start_url),
        );

        loop {
            self.events.info(
                Phase::Links,
                format!("Collecting links from page {}", state.current_page),
            );

            revealer::reveal(&self.session, &self.reveal).await?;
            self.throttle.delay().await;

            let links =
                harvester::collect_links(&self.session, &self.filter, self.element_timeout).await?;
            let titles = harvester::collect_titles(&self.session).await?;

            let found = links.len();
            let added = state.add_links(links);
            state.add_titles(titles);
            *pages_visited += 1;
            self.events.info(
                Phase::Links,
                format!(
                    "Found {} poem links on page {} ({} new)",
                    found, state.current_page, added
                ),
            );

            if max_pages.is_some_and(|max| state.current_page >= max) {
                self.events.info(
                    Phase::Links,
                    format!("Reached maximum pages limit: {}", state.current_page),
                );
                break;
            }

            if !paginator::advance(&self.session, self.element_timeout, self.next_page_settle)
                .await?
            {
                self.events
                    .info(Phase::Links, "No more pages to traverse".to_string());
                break;
            }

            state.current_page += 1;
            self.throttle.delay().await;
        }

        Ok(())
    }

    /// Scrapes metadata for the first `max_items` collected links (all of
    /// them when `None`), in the order they were discovered.
    ///
    /// Items that fail are logged and left out; nothing is retried.
    pub async fn scrape_metadata(
        &self,
        state: &CrawlState,
        max_items: Option<usize>,
    ) -> Vec<ItemMetadata> {
        let frontier = state.frontier(max_items);
        let total = frontier.len();
        self.events.info(
            Phase::Metadata,
            format!("Starting to scrape metadata for {} poems", total),
        );

        let mut results = Vec::with_capacity(total);
        for (i, link) in frontier.iter().enumerate() {
            self.events.info(
                Phase::Metadata,
                format!("Scraping metadata for poem {}/{}", i + 1, total),
            );

            match extractor::extract(&self.session, &self.throttle, link).await {
                Ok(metadata) => results.push(metadata),
                Err(e) => self.events.error(
                    Phase::Metadata,
                    Some(link.as_str()),
                    format!("Error scraping {}: {}", link, e),
                ),
            }
            self.throttle.delay().await;
        }

        self.events.info(
            Phase::Metadata,
            format!("Scraped metadata for {} of {} poems", results.len(), total),
        );
        results
    }
}
