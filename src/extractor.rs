use log::warn;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::ExtractionError,
    fetcher::RawFragment,
    text_manipulators::{normalize_whitespace, resolve_link},
};

/// One press release. `link` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub date: String,
    pub title: String,
    pub link: String,
    pub ministry: String,
    pub matched_keywords: Vec<String>,
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ExtractionError> {
    let text = value.map(normalize_whitespace).unwrap_or_default();
    if text.is_empty() {
        return Err(ExtractionError::MissingField(field));
    }
    Ok(text)
}

/// Normalizes a raw fragment into a record. Keywords are left empty for the
/// relevance filter to fill in.
pub fn extract(fragment: &RawFragment, base_url: &Url) -> Result<ListingRecord, ExtractionError> {
    let title = required(fragment.title.as_deref(), "title")?;
    // Only trimmed: interior characters are part of the link's identity.
    let href = fragment.href.as_deref().map(str::trim).unwrap_or_default();
    if href.is_empty() {
        return Err(ExtractionError::MissingField("link"));
    }
    let date = required(fragment.date.as_deref(), "date")?;
    let ministry = required(fragment.ministry.as_deref(), "ministry")?;

    let link = resolve_link(base_url, href).map_err(|e| ExtractionError::InvalidLink {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    Ok(ListingRecord {
        date,
        title,
        link: link.to_string(),
        ministry,
        matched_keywords: vec![],
    })
}

/// Extracts every fragment it can; malformed ones are logged and skipped.
/// Returns the records together with the number of fragments dropped.
pub fn extract_all(fragments: &[RawFragment], base_url: &Url) -> (Vec<ListingRecord>, usize) {
    let mut records = Vec::with_capacity(fragments.len());
    let mut failures = 0;
    for (index, fragment) in fragments.iter().enumerate() {
        match extract(fragment, base_url) {
            Ok(record) => records.push(record),
            Err(e) => {
                failures += 1;
                warn!("Skipping listing fragment #{index}: {e}");
            }
        }
    }
    (records, failures)
}
