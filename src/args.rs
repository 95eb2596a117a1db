use clap::Parser;
use poem_harvest::HarvestConfig;
use poem_harvest::config::ConfigError;
use std::path::PathBuf;

/// Every flag is optional; without any the full default harvest runs
#[derive(Parser, Debug)]
#[command(name = "poem-harvest")]
#[command(about = "Collects poem links, listing tags and poem metadata from a poetry site")]
#[command(version)]
pub struct Args {
    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listing page to start from
    #[arg(long)]
    pub start_url: Option<String>,

    /// Maximum number of listing pages to visit
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum number of poems to scrape metadata for
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Ignore page and poem limits
    #[arg(long, conflicts_with_all = ["max_pages", "max_items"])]
    pub unbounded: bool,

    /// Metadata JSON output (defaults to a timestamped file name)
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Title and tag CSV output
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// WebDriver server, e.g. a running chromedriver
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl Args {
    /// Merge file configuration, the WEBDRIVER_URL environment variable and
    /// flags, in increasing precedence
    pub fn into_config(self) -> Result<HarvestConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(self, config: &mut HarvestConfig) {
        if let Some(start_url) = self.start_url {
            config.start_url = start_url;
        }
        if self.unbounded {
            config.max_pages = None;
            config.max_items = None;
        }
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }
        if self.max_items.is_some() {
            config.max_items = self.max_items;
        }
        if let Some(json_out) = self.json_out {
            config.json_output = Some(json_out);
        }
        if let Some(csv_out) = self.csv_out {
            config.csv_output = csv_out;
        }
        if let Some(webdriver_url) = self.webdriver_url {
            config.webdriver_url = webdriver_url;
        }
    }
}
