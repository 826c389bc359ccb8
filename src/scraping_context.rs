use log::info;

use crate::{
    config::{ListingUrlBuilder, TrackerConfig},
    fetcher::{Fetcher, HttpFetcher, SnapshotFetcher},
    relevance::RelevanceFilter,
    requests::RequestClient,
    store::CsvStore,
};

/// Everything one run needs, wired from the configuration.
pub struct ScrapingContext {
    pub config: TrackerConfig,
    pub fetcher: Box<dyn Fetcher>,
    pub filter: RelevanceFilter,
    pub store: CsvStore,
}

impl ScrapingContext {
    pub fn new(config: TrackerConfig) -> anyhow::Result<Self> {
        let fetcher: Box<dyn Fetcher> = match &config.snapshot_dir {
            Some(dir) => Box::new(SnapshotFetcher::new(dir, config.selectors.clone())),
            None => {
                let request_client = RequestClient::new(config.request_timeout)?;
                let urls = ListingUrlBuilder::new(&config.listing_url)?;
                Box::new(HttpFetcher::new(request_client, urls, config.selectors.clone()))
            }
        };
        info!("Using {} fetcher", fetcher.name());

        let filter = RelevanceFilter::new(config.ministries.clone(), config.keywords.clone());
        let store = CsvStore::new(&config.store_path);
        Ok(ScrapingContext {
            config,
            fetcher,
            filter,
            store,
        })
    }
}
