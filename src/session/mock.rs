//! Scripted page session for tests.
//!
//! Listing pages are indexed by how many times the "next page" control has
//! been clicked; poem pages are looked up by the last navigated URL.

use super::{Locator, PageElement, PageSession, SessionError, SessionResult};
use crate::selectors;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockElement {
    attrs: HashMap<String, String>,
    props: HashMap<String, String>,
    text: String,
    children: HashMap<&'static str, Vec<MockElement>>,
    stale: bool,
    clicks: Option<Arc<AtomicUsize>>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_prop(mut self, name: &str, value: &str) -> Self {
        self.props.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_children(mut self, locator: Locator, children: Vec<MockElement>) -> Self {
        self.children.insert(locator.selector(), children);
        self
    }

    /// Every read on this element fails as if it was detached from the DOM
    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    fn check(&self) -> SessionResult<()> {
        if self.stale {
            Err(SessionError::StaleElement)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageElement for MockElement {
    async fn attr(&self, name: &str) -> SessionResult<Option<String>> {
        self.check()?;
        Ok(self.attrs.get(name).cloned())
    }

    async fn prop(&self, name: &str) -> SessionResult<Option<String>> {
        self.check()?;
        Ok(self.props.get(name).cloned())
    }

    async fn text(&self) -> SessionResult<String> {
        self.check()?;
        Ok(self.text.clone())
    }

    async fn find(&self, locator: Locator) -> SessionResult<Self> {
        self.check()?;
        self.children
            .get(locator.selector())
            .and_then(|found| found.first())
            .cloned()
            .ok_or_else(|| SessionError::NoSuchElement(locator.to_string()))
    }

    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<Self>> {
        self.check()?;
        Ok(self
            .children
            .get(locator.selector())
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self) -> SessionResult<()> {
        self.check()?;
        if let Some(clicks) = &self.clicks {
            clicks.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Anchor as it appears in a listing, with its resolved `href`
pub(crate) fn link(href: &str) -> MockElement {
    MockElement::new().with_prop("href", href).with_attr("href", href)
}

/// Poem page container; `None` leaves the corresponding element out
pub(crate) fn poem_page(
    title: Option<&str>,
    author: Option<&str>,
    lines: Option<&[&str]>,
) -> MockElement {
    let mut container = MockElement::new();
    if let Some(title) = title {
        container = container.with_children(
            selectors::POEM_TITLE,
            vec![MockElement::new().with_text(title)],
        );
    }
    if let Some(author) = author {
        container = container.with_children(
            selectors::POEM_AUTHOR,
            vec![MockElement::new().with_text(author)],
        );
    }
    if let Some(lines) = lines {
        let body = MockElement::new().with_children(
            selectors::POEM_LINE,
            lines.iter().map(|l| MockElement::new().with_text(l)).collect(),
        );
        container = container.with_children(selectors::POEM_BODY, vec![body]);
    }
    container
}

/// One title entry of a listing page
pub(crate) fn title_item(title: &str, tags: &[&str]) -> MockElement {
    MockElement::new()
        .with_children(
            selectors::TITLE_ANCHOR,
            vec![MockElement::new().with_text(title)],
        )
        .with_children(
            selectors::TITLE_TAG,
            tags.iter()
                .map(|t| MockElement::new().with_prop("textContent", t))
                .collect(),
        )
}

#[derive(Debug, Clone, Default)]
struct MockListing {
    links: Vec<MockElement>,
    title_list: Option<MockElement>,
}

/// What the session observed, shared with the test after the session moves
#[derive(Debug, Default)]
pub(crate) struct MockLog {
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub settles: usize,
    pub closed: bool,
}

pub(crate) struct MockSession {
    listings: Vec<MockListing>,
    page_index: Arc<AtomicUsize>,
    next_pages: Option<usize>,
    stale_next: bool,
    heights: Mutex<VecDeque<i64>>,
    item_pages: HashMap<String, MockElement>,
    unreachable: HashSet<String>,
    failing_listing: Option<usize>,
    current_url: Mutex<String>,
    log: Arc<Mutex<MockLog>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            listings: Vec::new(),
            page_index: Arc::new(AtomicUsize::new(0)),
            next_pages: Some(0),
            stale_next: false,
            heights: Mutex::new(VecDeque::from([100])),
            item_pages: HashMap::new(),
            unreachable: HashSet::new(),
            failing_listing: None,
            current_url: Mutex::new(String::new()),
            log: Arc::new(Mutex::new(MockLog::default())),
        }
    }

    /// Append a listing page with the given anchors and title entries
    pub fn with_listing(mut self, links: Vec<MockElement>, titles: Vec<MockElement>) -> Self {
        let title_list = MockElement::new().with_children(selectors::TITLE_ITEM, titles);
        self.listings.push(MockListing {
            links,
            title_list: Some(title_list),
        });
        self
    }

    /// Append a listing page whose title container is missing
    pub fn with_bare_listing(mut self, links: Vec<MockElement>) -> Self {
        self.listings.push(MockListing {
            links,
            title_list: None,
        });
        self
    }

    /// Successive `document.body.scrollHeight` readings; the last one repeats
    pub fn with_heights(self, heights: &[i64]) -> Self {
        *self.heights.lock().unwrap() = heights.iter().copied().collect();
        self
    }

    /// The next control stays clickable forever
    pub fn always_next(mut self) -> Self {
        self.next_pages = None;
        self
    }

    /// The next control is clickable `n` times, then disappears
    pub fn next_pages(mut self, n: usize) -> Self {
        self.next_pages = Some(n);
        self
    }

    /// The next control is found but detached before it can be used
    pub fn stale_next(mut self) -> Self {
        self.stale_next = true;
        self
    }

    pub fn with_item_page(mut self, url: &str, container: MockElement) -> Self {
        self.item_pages.insert(url.to_string(), container);
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// Link collection on listing `index` fails with a driver error
    pub fn failing_listing(mut self, index: usize) -> Self {
        self.failing_listing = Some(index);
        self
    }

    pub fn log(&self) -> Arc<Mutex<MockLog>> {
        Arc::clone(&self.log)
    }

    pub fn clicks(&self) -> usize {
        self.page_index.load(Ordering::SeqCst)
    }

    fn listing_index(&self) -> usize {
        self.page_index.load(Ordering::SeqCst)
    }

    fn listing(&self) -> MockListing {
        let index = self.listing_index();
        match self.listings.len() {
            0 => MockListing::default(),
            n => self.listings[index.min(n - 1)].clone(),
        }
    }

    fn next_height(&self) -> i64 {
        let mut heights = self.heights.lock().unwrap();
        if heights.len() > 1 {
            heights.pop_front().unwrap_or_default()
        } else {
            heights.front().copied().unwrap_or_default()
        }
    }
}

#[async_trait]
impl PageSession for MockSession {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> SessionResult<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        if self.unreachable.contains(url) {
            return Err(SessionError::Driver(format!("net::ERR_CONNECTION_REFUSED {}", url)));
        }
        *self.current_url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn execute(&self, script: &str, _args: Vec<Value>) -> SessionResult<Value> {
        match script {
            selectors::PAGE_HEIGHT_SCRIPT => Ok(Value::from(self.next_height())),
            selectors::SCROLL_TO_BOTTOM_SCRIPT => {
                self.log.lock().unwrap().scrolls += 1;
                Ok(Value::Null)
            }
            selectors::SETTLE_SCROLL_SCRIPT => {
                self.log.lock().unwrap().settles += 1;
                Ok(Value::Null)
            }
            _ => Ok(Value::Null),
        }
    }

    async fn find(&self, locator: Locator) -> SessionResult<MockElement> {
        let found = if locator == selectors::TITLE_LIST {
            self.listing().title_list
        } else if locator == selectors::METADATA_CONTAINER {
            let url = self.current_url.lock().unwrap().clone();
            self.item_pages.get(&url).cloned()
        } else {
            None
        };
        found.ok_or_else(|| SessionError::NoSuchElement(locator.to_string()))
    }

    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<MockElement>> {
        if locator == selectors::ITEM_LINK {
            Ok(self.listing().links)
        } else {
            Ok(Vec::new())
        }
    }

    async fn wait_for_all(
        &self,
        locator: Locator,
        _timeout: Duration,
    ) -> SessionResult<Vec<MockElement>> {
        if locator == selectors::ITEM_LINK && self.failing_listing == Some(self.listing_index()) {
            return Err(SessionError::Driver("session deleted".to_string()));
        }
        let found = self.find_all(locator).await?;
        if found.is_empty() {
            Err(SessionError::Timeout)
        } else {
            Ok(found)
        }
    }

    async fn wait_for_clickable(
        &self,
        locator: Locator,
        _timeout: Duration,
    ) -> SessionResult<MockElement> {
        let available = match self.next_pages {
            None => true,
            Some(n) => self.clicks() < n,
        };
        if locator == selectors::NEXT_PAGE && available {
            let mut button = MockElement::new();
            button.clicks = Some(Arc::clone(&self.page_index));
            button.stale = self.stale_next;
            Ok(button)
        } else {
            Err(SessionError::Timeout)
        }
    }

    async fn scroll_into_view(&self, element: &MockElement) -> SessionResult<()> {
        element.check()
    }

    async fn close(self) -> SessionResult<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}
