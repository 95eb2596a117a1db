use super::{Locator, PageElement, PageSession, SessionError, SessionResult};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;

/// User agent announced to the origin server
pub const USER_AGENT: &str = "PoetryMetadataResearchBot/1.0";

/// Interval between clickability probes
const CLICKABLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Endpoints tried when the configured WebDriver URL is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

impl From<CmdError> for SessionError {
    fn from(error: CmdError) -> Self {
        if matches!(error, CmdError::WaitTimeout) {
            SessionError::Timeout
        } else if error.is_stale_element_reference() {
            SessionError::StaleElement
        } else if error.is_no_such_element() {
            SessionError::NoSuchElement(error.to_string())
        } else {
            SessionError::Driver(error.to_string())
        }
    }
}

impl From<Locator> for fantoccini::Locator<'static> {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Css(s) => fantoccini::Locator::Css(s),
            Locator::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

/// Browser page driven over the WebDriver protocol
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Opens a browser session, trying the well-known local endpoints when
    /// `webdriver_url` cannot be reached.
    pub async fn connect(webdriver_url: &str) -> SessionResult<Self> {
        match open_client(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = open_client(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Driver(format!(
            "no WebDriver server reachable at {} or any fallback",
            webdriver_url
        )))
    }
}

async fn open_client(webdriver_url: &str) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut capabilities = serde_json::Map::new();
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": [format!("--user-agent={}", USER_AGENT), "--start-maximized"]
        }),
    );

    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities);
    builder.connect(webdriver_url).await
}

/// Element handle backed by a WebDriver element reference
pub struct WebDriverElement(Element);

#[async_trait]
impl PageElement for WebDriverElement {
    async fn attr(&self, name: &str) -> SessionResult<Option<String>> {
        Ok(self.0.attr(name).await?)
    }

    async fn prop(&self, name: &str) -> SessionResult<Option<String>> {
        Ok(self.0.prop(name).await?)
    }

    async fn text(&self) -> SessionResult<String> {
        Ok(self.0.text().await?)
    }

    async fn find(&self, locator: Locator) -> SessionResult<Self> {
        Ok(WebDriverElement(self.0.find(locator.into()).await?))
    }

    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<Self>> {
        let elements = self.0.find_all(locator.into()).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn click(&self) -> SessionResult<()> {
        Ok(self.0.click().await?)
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    type Element = WebDriverElement;

    async fn navigate(&self, url: &str) -> SessionResult<()> {
        Ok(self.client.goto(url).await?)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> SessionResult<Value> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn find(&self, locator: Locator) -> SessionResult<WebDriverElement> {
        Ok(WebDriverElement(self.client.find(locator.into()).await?))
    }

    async fn find_all(&self, locator: Locator) -> SessionResult<Vec<WebDriverElement>> {
        let elements = self.client.find_all(locator.into()).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn wait_for_all(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> SessionResult<Vec<WebDriverElement>> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(locator.into())
            .await?;
        self.find_all(locator).await
    }

    async fn wait_for_clickable(
        &self,
        locator: Locator,
        timeout: Duration,
    ) -> SessionResult<WebDriverElement> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.client.find(locator.into()).await {
                Ok(element) => match is_clickable(&element).await {
                    Ok(true) => return Ok(WebDriverElement(element)),
                    Ok(false) => {}
                    Err(e) if e.is_recoverable() => {}
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    let e = SessionError::from(e);
                    if !e.is_recoverable() {
                        return Err(e);
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(SessionError::Timeout);
            }
            tokio::time::sleep(CLICKABLE_POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&self, element: &WebDriverElement) -> SessionResult<()> {
        let arg = serde_json::to_value(&element.0)
            .map_err(|e| SessionError::Driver(format!("cannot reference element: {}", e)))?;
        self.client
            .execute(crate::selectors::SCROLL_INTO_VIEW_SCRIPT, vec![arg])
            .await?;
        Ok(())
    }

    async fn close(self) -> SessionResult<()> {
        Ok(self.client.close().await?)
    }
}

async fn is_clickable(element: &Element) -> SessionResult<bool> {
    Ok(element.is_displayed().await? && element.is_enabled().await?)
}
