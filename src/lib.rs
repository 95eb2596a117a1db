//! Poem harvester: walks a paginated poetry listing in a real browser,
//! collects poem links and listing titles, then scrapes metadata from each
//! poem page.
//!
//! Crawling is polite and fail-soft: every page load is preceded by a random
//! pause, and failures shrink the output instead of aborting the run.

pub mod config;
pub mod crawlers;
pub mod events;
pub mod filter;
pub mod output;
pub mod results;
pub mod selectors;
pub mod session;
pub mod throttle;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{DelayRange, HarvestConfig, RevealOptions};
pub use crawlers::{Crawler, LinkCollectionSummary};
pub use results::{CrawlState, ItemLink, ItemMetadata, TitleRecord};

use config::ConfigError;
use events::{EventLog, Phase};
use filter::LinkFilter;
use session::{PageSession, SessionError, WebDriverSession};
use thiserror::Error;

/// Errors surfaced by a harvest
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid link filter pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("Failed to load {url}: {source}")]
    Navigation { url: String, source: SessionError },

    #[error("Metadata region not found on {url}: {source}")]
    MissingContainer { url: String, source: SessionError },

    #[error("Page session error: {0}")]
    Session(#[from] SessionError),
}

/// Everything a harvest produced
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Links and title records gathered from the listing
    pub state: CrawlState,

    pub links: LinkCollectionSummary,

    /// Metadata for every poem that could be scraped
    pub metadata: Vec<ItemMetadata>,
}

/// Builder for a two-phase harvest run
pub struct Harvest {
    config: HarvestConfig,
    events: EventLog,
}

impl Harvest {
    /// Create a harvest starting at `start_url` with default settings
    pub fn new(start_url: &str) -> Self {
        Self::from_config(HarvestConfig::new(start_url))
    }

    /// Create a harvest from a complete configuration
    pub fn from_config(config: HarvestConfig) -> Self {
        Self {
            config,
            events: EventLog::new(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, HarvestError> {
        Ok(Self::from_config(HarvestConfig::from_file(path)?))
    }

    /// Listing pages to visit at most (`None` for all)
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Poems to scrape at most (`None` for all)
    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.config.max_items = max_items;
        self
    }

    pub fn with_delay_range(mut self, delay: DelayRange) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Route crawl events through `events`
    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Connect to WebDriver and run both phases
    pub async fn run(self) -> Result<HarvestReport, HarvestError> {
        // Fail before launching a browser
        self.prepare()?;

        let session = WebDriverSession::connect(&self.config.webdriver_url).await?;
        self.events.info(
            Phase::Session,
            format!("Browser session open via {}", self.config.webdriver_url),
        );
        self.run_with_session(session).await
    }

    /// Run both phases on an already open session.
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn run_with_session<S: PageSession>(
        self,
        session: S,
    ) -> Result<HarvestReport, HarvestError> {
        let filter = match self.prepare() {
            Ok(filter) => filter,
            Err(e) => {
                close_session(session, &self.events).await;
                return Err(e);
            }
        };

        let crawler = Crawler::new(session, filter, &self.config).with_events(self.events.clone());
        let mut state = CrawlState::new();

        let links = crawler
            .collect_links(&mut state, &self.config.start_url, self.config.max_pages)
            .await;
        let metadata = crawler.scrape_metadata(&state, self.config.max_items).await;

        close_session(crawler.into_session(), &self.events).await;

        Ok(HarvestReport {
            state,
            links,
            metadata,
        })
    }

    fn prepare(&self) -> Result<LinkFilter, HarvestError> {
        self.config.validate()?;
        Ok(LinkFilter::new(&self.config.link_filter)?)
    }
}

async fn close_session<S: PageSession>(session: S, events: &EventLog) {
    match session.close().await {
        Ok(()) => events.info(Phase::Session, "Browser session closed".to_string()),
        Err(e) => events.warn(
            Phase::Session,
            None,
            format!("Failed to close browser session: {}", e),
        ),
    }
}
