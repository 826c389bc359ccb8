use log::{error, info};
use serde::Serialize;
use url::Url;

use crate::{
    error::PipelineError,
    extractor::{ListingRecord, extract_all},
    fetcher::Fetcher,
    relevance::RelevanceFilter,
};

#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub page_count: u32,
    pub base_url: Url,
}

/// Counters for one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageStats {
    pub pages_attempted: u32,
    pub pages_failed: u32,
    pub fragments_seen: usize,
    pub extraction_failures: usize,
    pub records_kept: usize,
}

#[derive(Debug)]
pub struct Collection {
    pub records: Vec<ListingRecord>,
    pub pages: PageStats,
}

/// Walks pages `1..=page_count` one after another, keeping the in-scope
/// records in page order. A page that fails to fetch contributes nothing;
/// only a run where every page failed is an error.
pub async fn collect(
    fetcher: &dyn Fetcher,
    settings: &CollectSettings,
    filter: &RelevanceFilter,
) -> Result<Collection, PipelineError> {
    let mut records = vec![];
    let mut stats = PageStats::default();

    for page in 1..=settings.page_count {
        stats.pages_attempted += 1;
        let fragments = match fetcher.fetch_page(page).await {
            Ok(fragments) => fragments,
            Err(e) => {
                error!("Listing page {page} failed: {e}");
                stats.pages_failed += 1;
                continue;
            }
        };

        let (extracted, failures) = extract_all(&fragments, &settings.base_url);
        let before = records.len();
        records.extend(extracted.into_iter().filter_map(|r| filter.apply(r)));

        stats.fragments_seen += fragments.len();
        stats.extraction_failures += failures;
        info!(
            "Page {page}: {} fragments, {} relevant",
            fragments.len(),
            records.len() - before
        );
    }

    if stats.pages_attempted > 0 && stats.pages_failed == stats.pages_attempted {
        return Err(PipelineError::AllPagesFailed {
            pages: stats.pages_attempted,
        });
    }

    stats.records_kept = records.len();
    Ok(Collection {
        records,
        pages: stats,
    })
}
