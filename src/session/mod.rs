//! Page session capability consumed by the crawlers.
//!
//! The crawl core only ever talks to a [`PageSession`]; the production
//! implementation drives a browser over WebDriver ([`webdriver`]), the test
//! suites use a scripted in-memory page.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use webdriver::WebDriverSession;

/// How an element is located on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector
    Css(&'static str),
    /// XPath expression
    XPath(&'static str),
}

impl Locator {
    /// The raw selector string
    pub fn selector(&self) -> &'static str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css `{}`", s),
            Locator::XPath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

/// Errors reported by a page session or one of its elements
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("timed out waiting for the page")]
    Timeout,

    #[error("element is no longer attached to the page")]
    StaleElement,

    #[error("no element matches {0}")]
    NoSuchElement(String),

    #[error("unexpected script result: {0}")]
    UnexpectedScriptResult(String),

    #[error("webdriver error: {0}")]
    Driver(String),
}

impl SessionError {
    /// Timeouts, detached elements and misses are expected on a live page
    /// and are absorbed by the extraction passes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::Timeout | SessionError::StaleElement | SessionError::NoSuchElement(_)
        )
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// A single handle into the loaded DOM
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// Read an HTML attribute as written in the markup
    async fn attr(&self, name: &str) -> SessionResult<Option<String>>;

    /// Read a DOM property (e.g. the resolved `href` or `textContent`)
    async fn prop(&self, name: &str) -> SessionResult<Option<String>>;

    /// Rendered text of the element
    async fn text(&self) -> SessionResult<String>;

    /// First descendant matching the locator
    async fn find(&self, locator: Locator) -> SessionResult<Self>;

    /// All descendants matching the locator (possibly none)
    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<Self>>;

    async fn click(&self) -> SessionResult<()>;
}

/// One exclusively owned browser page
///
/// All calls are made sequentially from a single control flow.
#[async_trait]
pub trait PageSession: Send + Sync {
    type Element: PageElement;

    /// Load `url` and wait for the document to be ready
    async fn navigate(&self, url: &str) -> SessionResult<()>;

    /// Run a JavaScript snippet in the page and return its result
    async fn execute(&self, script: &str, args: Vec<Value>) -> SessionResult<Value>;

    async fn find(&self, locator: Locator) -> SessionResult<Self::Element>;

    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<Self::Element>>;

    /// Wait until at least one element matches, then return every match
    async fn wait_for_all(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> SessionResult<Vec<Self::Element>>;

    /// Wait until an element is present, displayed and enabled
    async fn wait_for_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> SessionResult<Self::Element>;

    async fn scroll_into_view(&self, element: &Self::Element) -> SessionResult<()>;

    /// End the browser session
    async fn close(self) -> SessionResult<()>
    where
        Self: Sized;
}
