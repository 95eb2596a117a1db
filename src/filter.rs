use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for deciding which listing anchors are poem links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Path segment every poem URL contains
    #[serde(default = "default_item_segment")]
    pub item_segment: String,

    /// Regex patterns for URLs to drop even when they contain the segment
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_item_segment() -> String {
    "/poems/".to_string()
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            item_segment: default_item_segment(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Filter turning raw `href` values into poem links
#[derive(Debug)]
pub struct LinkFilter {
    item_segment: String,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self {
            item_segment: default_item_segment(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: &LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            item_segment: config.item_segment.clone(),
            exclude_regexes,
        })
    }

    /// Returns the normalized poem link for `href`, or `None` when the
    /// anchor does not point at a poem
    pub fn accept(&self, href: &str) -> Option<String> {
        if !href.contains(&self.item_segment) {
            return None;
        }

        let url = Url::parse(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let normalized = self.normalize_url(&url);
        let url_str = normalized.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return None;
        }

        Some(normalized.to_string())
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
