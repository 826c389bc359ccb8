use std::path::Path;

use chrono::{DateTime, Utc};
use log::{error, info};

use crate::{
    collector::{CollectSettings, PageStats, collect},
    error::{PipelineError, StoreError},
    extractor::ListingRecord,
    fetcher::Fetcher,
    reconciler::{RecordSet, reconcile},
    relevance::RelevanceFilter,
    scraping_context::ScrapingContext,
    store::{Store, export_csv},
};

/// Outcome of one run. A failed save is carried here instead of being
/// returned as an error so the new items are never lost with it.
#[derive(Debug)]
pub struct RunReport {
    pub finished_at: DateTime<Utc>,
    pub combined: RecordSet,
    pub new_ones: Vec<ListingRecord>,
    pub pages: PageStats,
    pub save_error: Option<StoreError>,
}

impl RunReport {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }
}

/// fetch → extract → filter → reconcile with history → save.
pub async fn run(
    fetcher: &dyn Fetcher,
    settings: &CollectSettings,
    filter: &RelevanceFilter,
    store: &dyn Store,
) -> Result<RunReport, PipelineError> {
    let history = store.load();
    let known = history.len();

    let collection = collect(fetcher, settings, filter).await?;
    let reconciliation = reconcile(history, collection.records);
    info!(
        "{} relevant releases collected, {} new, {} known before this run",
        collection.pages.records_kept,
        reconciliation.new_ones.len(),
        known
    );

    let save_error = match store.save(&reconciliation.combined) {
        Ok(()) => None,
        Err(e) => {
            error!("Could not persist {} releases: {e}", reconciliation.combined.len());
            Some(e)
        }
    };

    Ok(RunReport {
        finished_at: Utc::now(),
        combined: reconciliation.combined,
        new_ones: reconciliation.new_ones,
        pages: collection.pages,
        save_error,
    })
}

/// Rewrites the download file with this run's new items. A run with nothing
/// new leaves a header-only file, never the previous run's rows.
pub fn export_new_items(report: &RunReport, path: &Path) -> Result<(), StoreError> {
    export_csv(path, &report.new_ones)?;
    info!(
        "Wrote {} new press releases to {}",
        report.new_ones.len(),
        path.display()
    );
    Ok(())
}

pub async fn run_with_context(ctx: &ScrapingContext) -> Result<RunReport, PipelineError> {
    let settings = CollectSettings {
        page_count: ctx.config.page_count,
        base_url: ctx.config.base_url.clone(),
    };
    run(ctx.fetcher.as_ref(), &settings, &ctx.filter, &ctx.store).await
}
