use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{error::StoreError, extractor::ListingRecord, reconciler::RecordSet};

/// Separator used to keep the ordered keyword list in a single cell.
pub const KEYWORD_DELIMITER: &str = ", ";

/// Persistence for the historical record set.
pub trait Store {
    /// Never fails: an absent or unreadable store is treated as empty history.
    fn load(&self) -> RecordSet;

    fn save(&self, records: &RecordSet) -> Result<(), StoreError>;
}

/// One row of the tabular store.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Link")]
    link: String,
    #[serde(rename = "Ministry")]
    ministry: String,
    #[serde(rename = "Matched Keywords")]
    matched_keywords: String,
}

impl From<&ListingRecord> for StoredRow {
    fn from(record: &ListingRecord) -> Self {
        StoredRow {
            date: record.date.clone(),
            title: record.title.clone(),
            link: record.link.clone(),
            ministry: record.ministry.clone(),
            matched_keywords: record.matched_keywords.join(KEYWORD_DELIMITER),
        }
    }
}

impl From<StoredRow> for ListingRecord {
    fn from(row: StoredRow) -> Self {
        let matched_keywords = if row.matched_keywords.is_empty() {
            vec![]
        } else {
            row.matched_keywords
                .split(KEYWORD_DELIMITER)
                .map(String::from)
                .collect()
        };
        ListingRecord {
            date: row.date,
            title: row.title,
            link: row.link,
            ministry: row.ministry,
            matched_keywords,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes records as CSV with the `Date, Title, Link, Ministry, Matched
/// Keywords` header. The file is written beside the target and renamed over
/// it, so a failed write leaves the previous file intact.
pub fn export_csv<'a, I>(path: &Path, records: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = write_rows(&tmp_path, records)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(io_error(path)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_rows<'a, I>(path: &Path, records: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0usize;
    for record in records {
        writer.serialize(StoredRow::from(record))?;
        rows += 1;
    }
    if rows == 0 {
        // serde only emits the header alongside the first row.
        writer.write_record(["Date", "Title", "Link", "Ministry", "Matched Keywords"])?;
    }
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

/// Reads a CSV written by [`export_csv`]. Duplicate links keep the last row.
pub fn import_csv(path: &Path) -> Result<RecordSet, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = RecordSet::new();
    for row in reader.deserialize::<StoredRow>() {
        records.upsert(row?.into());
    }
    Ok(records)
}

/// The historical record set as a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for CsvStore {
    fn load(&self) -> RecordSet {
        if !self.path.exists() {
            info!("No history at {}, starting empty", self.path.display());
            return RecordSet::new();
        }
        match import_csv(&self.path) {
            Ok(records) => {
                info!(
                    "Loaded {} known releases from {}",
                    records.len(),
                    self.path.display()
                );
                records
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable history at {}: {e}",
                    self.path.display()
                );
                RecordSet::new()
            }
        }
    }

    fn save(&self, records: &RecordSet) -> Result<(), StoreError> {
        export_csv(&self.path, records)?;
        info!("Saved {} releases to {}", records.len(), self.path.display());
        Ok(())
    }
}
