use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// URL identifying one poem page
pub type ItemLink = String;

/// Title and tags of one poem as shown on a listing page
///
/// Not keyed to an [`ItemLink`]; records keep listing traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub title: String,
    pub tags: Vec<String>,
}

impl TitleRecord {
    pub fn new(title: String, tags: Vec<String>) -> Self {
        Self { title, tags }
    }
}

/// Metadata scraped from one poem page
///
/// Every field besides `url` is filled independently and stays empty when
/// the page does not provide it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub url: String,
    pub poem_title: String,
    pub author: String,
    pub poem_text: Vec<String>,
}

impl ItemMetadata {
    /// Metadata for `url` with every field at its default
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

/// Session-scoped state accumulated by the link collection phase
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    links: Vec<ItemLink>,
    seen: HashSet<ItemLink>,
    titles: Vec<TitleRecord>,

    /// Listing page currently being visited (1-based)
    pub current_page: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of links, keeping first-seen order. Returns how many
    /// were not already known.
    pub fn add_links<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = ItemLink>,
    {
        let mut added = 0;
        for link in links {
            if self.seen.insert(link.clone()) {
                self.links.push(link);
                added += 1;
            }
        }
        added
    }

    /// Append a page's title records after those already collected
    pub fn add_titles<I>(&mut self, titles: I)
    where
        I: IntoIterator<Item = TitleRecord>,
    {
        self.titles.extend(titles);
    }

    /// Distinct links in the order they were first harvested
    pub fn links(&self) -> &[ItemLink] {
        &self.links
    }

    pub fn titles(&self) -> &[TitleRecord] {
        &self.titles
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    /// Up to `max_items` links to scrape, or all of them
    pub fn frontier(&self, max_items: Option<usize>) -> &[ItemLink] {
        match max_items {
            Some(max) => &self.links[..max.min(self.links.len())],
            None => &self.links,
        }
    }
}
