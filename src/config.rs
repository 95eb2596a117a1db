use crate::filter::LinkFilterConfig;
use crate::utils::secs;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Bounds of the random pause taken before every network-affecting action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Shortest pause in seconds
    pub min_secs: f64,

    /// Longest pause in seconds
    pub max_secs: f64,
}

impl DelayRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// A range that never waits
    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn min(&self) -> Duration {
        secs(self.min_secs)
    }

    pub fn max(&self) -> Duration {
        secs(self.max_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_secs.is_finite() && self.max_secs.is_finite()) || self.min_secs < 0.0 {
            return Err(ConfigError::Validation(format!(
                "delay range must be finite and non-negative, got [{}, {}]",
                self.min_secs, self.max_secs
            )));
        }
        if self.min_secs > self.max_secs {
            return Err(ConfigError::Validation(format!(
                "delay range minimum {} exceeds maximum {}",
                self.min_secs, self.max_secs
            )));
        }
        Ok(())
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(2.0, 4.0)
    }
}

/// Tuning for the infinite-scroll page revealer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealOptions {
    /// Wait between a scroll and the following height measurement
    #[serde(default = "default_scroll_pause")]
    pub pause_secs: f64,

    /// Chance per growing iteration of a short upward "settle" scroll
    #[serde(default = "default_settle_probability")]
    pub settle_probability: f64,

    /// Wait after a settle scroll
    #[serde(default = "default_settle_pause")]
    pub settle_pause_secs: f64,

    /// Give up after this many scrolls on pages that never stop growing
    #[serde(default)]
    pub max_scrolls: Option<usize>,
}

impl RevealOptions {
    pub fn pause(&self) -> Duration {
        secs(self.pause_secs)
    }

    pub fn settle_pause(&self) -> Duration {
        secs(self.settle_pause_secs)
    }

    /// Options that scroll without waiting or settling
    pub fn immediate() -> Self {
        Self {
            pause_secs: 0.0,
            settle_probability: 0.0,
            settle_pause_secs: 0.0,
            max_scrolls: None,
        }
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            pause_secs: default_scroll_pause(),
            settle_probability: default_settle_probability(),
            settle_pause_secs: default_settle_pause(),
            max_scrolls: None,
        }
    }
}

/// Configuration for a full harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// First listing page
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Stop link collection after this many listing pages
    #[serde(default = "default_max_pages")]
    pub max_pages: Option<usize>,

    /// Scrape metadata for at most this many links
    #[serde(default = "default_max_items")]
    pub max_items: Option<usize>,

    #[serde(default)]
    pub delay: DelayRange,

    #[serde(default)]
    pub reveal: RevealOptions,

    /// Bound on waiting for listing elements and the next-page control
    #[serde(default = "default_element_timeout")]
    pub element_timeout_secs: f64,

    /// Pause between scrolling the next-page control into view and clicking it
    #[serde(default = "default_next_page_settle")]
    pub next_page_settle_secs: f64,

    #[serde(default)]
    pub link_filter: LinkFilterConfig,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Metadata JSON path; a timestamped name is used when unset
    #[serde(default)]
    pub json_output: Option<PathBuf>,

    /// Title/tag CSV path
    #[serde(default = "default_csv_output")]
    pub csv_output: PathBuf,
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_pages: default_max_pages(),
            max_items: default_max_items(),
            delay: DelayRange::default(),
            reveal: RevealOptions::default(),
            element_timeout_secs: default_element_timeout(),
            next_page_settle_secs: default_next_page_settle(),
            link_filter: LinkFilterConfig::default(),
            webdriver_url: default_webdriver_url(),
            json_output: None,
            csv_output: default_csv_output(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn element_timeout(&self) -> Duration {
        secs(self.element_timeout_secs)
    }

    pub fn next_page_settle(&self) -> Duration {
        secs(self.next_page_settle_secs)
    }

    /// Reject settings the crawl cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.start_url).map_err(|e| {
            ConfigError::Validation(format!("invalid start URL {}: {}", self.start_url, e))
        })?;
        self.delay.validate()?;

        if self.max_pages == Some(0) {
            return Err(ConfigError::Validation(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if self.max_items == Some(0) {
            return Err(ConfigError::Validation(
                "max_items must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.settle_probability) {
            return Err(ConfigError::Validation(format!(
                "settle probability {} is outside [0, 1]",
                self.reveal.settle_probability
            )));
        }
        for (name, value) in [
            ("reveal.pause_secs", self.reveal.pause_secs),
            ("reveal.settle_pause_secs", self.reveal.settle_pause_secs),
            ("element_timeout_secs", self.element_timeout_secs),
            ("next_page_settle_secs", self.next_page_settle_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::new(&default_start_url())
    }
}

fn default_start_url() -> String {
    "https://www.poetryfoundation.org/poems/browse/verse-forms".to_string()
}

fn default_max_pages() -> Option<usize> {
    Some(141)
}

fn default_max_items() -> Option<usize> {
    Some(2801)
}

fn default_scroll_pause() -> f64 {
    1.0
}

fn default_settle_probability() -> f64 {
    0.2
}

fn default_settle_pause() -> f64 {
    0.5
}

fn default_element_timeout() -> f64 {
    10.0
}

fn default_next_page_settle() -> f64 {
    0.5
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_csv_output() -> PathBuf {
    PathBuf::from("verse_forms_poem_tags.csv")
}
