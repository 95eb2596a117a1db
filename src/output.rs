//! Writers for the two output documents: poem metadata as JSON and listing
//! titles with their tags as CSV.

use crate::results::{ItemMetadata, TitleRecord};
use crate::utils::{format_tags, timestamped_filename};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// CSV row for a [`TitleRecord`]; field order gives the header
#[derive(Debug, Serialize)]
struct TitleRow<'a> {
    title: &'a str,
    tags: String,
}

impl<'a> From<&'a TitleRecord> for TitleRow<'a> {
    fn from(record: &'a TitleRecord) -> Self {
        Self {
            title: &record.title,
            tags: format_tags(&record.tags),
        }
    }
}

/// Pretty-printed JSON array, non-ASCII text kept as UTF-8
pub fn write_metadata_json<W: Write>(writer: W, records: &[ItemMetadata]) -> OutputResult<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// One row per title record; the header is written with the first row
pub fn write_titles_csv<W: Write>(writer: W, records: &[TitleRecord]) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(TitleRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save metadata to `path`, or to `poem_metadata_<timestamp>.json`
pub fn save_metadata(records: &[ItemMetadata], path: Option<&Path>) -> OutputResult<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(timestamped_filename("poem_metadata", "json")),
    };

    let mut writer = BufWriter::new(File::create(&path)?);
    write_metadata_json(&mut writer, records)?;
    writer.flush()?;

    ::log::info!("Successfully saved metadata to {}", path.display());
    Ok(path)
}

/// Save title records to `path`. Nothing is written without records, since
/// the header comes from the first one.
pub fn save_titles(records: &[TitleRecord], path: &Path) -> OutputResult<Option<PathBuf>> {
    if records.is_empty() {
        ::log::warn!("No title records collected, skipping {}", path.display());
        return Ok(None);
    }

    let writer = BufWriter::new(File::create(path)?);
    write_titles_csv(writer, records)?;

    ::log::info!("Data exported to {}", path.display());
    Ok(Some(path.to_path_buf()))
}
