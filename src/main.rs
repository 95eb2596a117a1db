use anyhow::Context;
use clap::Parser;
use poem_harvest::output::{save_metadata, save_titles};
use poem_harvest::utils::timestamped_filename;
use poem_harvest::{Harvest, HarvestReport};
use std::fs::File;
use std::io::{self, Write};

mod args;
use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();

    // Parse command-line arguments
    let args = Args::parse();
    let config = args.into_config().context("Invalid configuration")?;

    ::log::info!("Starting harvest at: {}", config.start_url);
    println!("Note: Harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
    );

    let start_time = std::time::Instant::now();
    let report = Harvest::from_config(config.clone())
        .run()
        .await
        .context("Harvest could not start")?;

    write_outputs(&report, &config);

    ::log::info!(
        "Harvest complete - {} pages, {} unique links, {} poems in {:.2} seconds",
        report.links.pages_visited,
        report.links.unique_links,
        report.metadata.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Output failures are logged; the run still counts as done
fn write_outputs(report: &HarvestReport, config: &poem_harvest::HarvestConfig) {
    if let Err(e) = save_metadata(&report.metadata, config.json_output.as_deref()) {
        ::log::error!("Error saving results: {}", e);
    }

    match save_titles(report.state.titles(), &config.csv_output) {
        Ok(Some(path)) => println!("Data exported to {}", path.display()),
        Ok(None) => {}
        Err(e) => ::log::error!("Error saving title records: {}", e),
    }
}

/// Log lines go to stderr and to `poetry_scraper_<timestamp>.log`
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let log_path = timestamped_filename("poetry_scraper", "log");
    match File::create(&log_path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
            builder.init();
        }
        Err(e) => {
            builder.init();
            ::log::warn!("Cannot create log file {}: {}", log_path, e);
        }
    }
}

/// Copies everything written to stderr into a file
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}
