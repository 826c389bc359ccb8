use std::path::PathBuf;

use async_trait::async_trait;
use log::info;
use scraper::{ElementRef, Html, Selector};

use crate::{
    config::ListingUrlBuilder, error::FetchError, requests::RequestClient,
    text_manipulators::extract_text,
};

/// One listing item as found on the page, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFragment {
    pub title: Option<String>,
    pub href: Option<String>,
    pub date: Option<String>,
    pub ministry: Option<String>,
}

/// Where the parts of a listing item live in the page markup. `title`, `date`
/// and `ministry` are resolved inside each `item`.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub item: Selector,
    pub title: Selector,
    pub date: Selector,
    pub ministry: Selector,
    /// Anchors whose href lacks this substring are navigation, not releases.
    pub link_filter: Option<String>,
}

fn first_text(item: ElementRef, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(extract_text)
}

/// Splits a listing page into raw fragments. Nothing is validated here; a
/// fragment with missing parts is still returned so the extractor can report
/// it.
pub fn parse_listing_html(html: &str, selectors: &ListingSelectors) -> Vec<RawFragment> {
    let document = Html::parse_document(html);
    let mut fragments = vec![];
    for item in document.select(&selectors.item) {
        let anchor = item.select(&selectors.title).next();
        let href = anchor.and_then(|a| a.value().attr("href")).map(str::to_string);

        if let (Some(filter), Some(href)) = (&selectors.link_filter, &href) {
            if !href.contains(filter.as_str()) {
                continue;
            }
        }

        fragments.push(RawFragment {
            title: anchor.map(extract_text),
            href,
            date: first_text(item, &selectors.date),
            ministry: first_text(item, &selectors.ministry),
        });
    }
    fragments
}

/// Source of listing pages. Implementations differ only in how they obtain the
/// page markup.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &str;

    /// Pages are numbered from 1.
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawFragment>, FetchError>;
}

/// Fetches the listing over plain HTTP and parses the static HTML.
pub struct HttpFetcher {
    client: RequestClient,
    urls: ListingUrlBuilder,
    selectors: ListingSelectors,
}

impl HttpFetcher {
    pub fn new(client: RequestClient, urls: ListingUrlBuilder, selectors: ListingSelectors) -> Self {
        Self {
            client,
            urls,
            selectors,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<RawFragment>, FetchError> {
        let url = self.urls.page_url(page)?;
        info!("Fetching listing page {page}: {url}");
        let html = self.client.fetch_url_body(url.as_str()).await?;
        Ok(parse_listing_html(&html, &self.selectors))
    }
}

/// Reads pages that a headless browser has already rendered to disk as
/// `page-<n>.html`.
pub struct SnapshotFetcher {
    dir: PathBuf,
    selectors: ListingSelectors,
}

impl SnapshotFetcher {
    pub fn new(dir: impl Into<PathBuf>, selectors: ListingSelectors) -> Self {
        Self {
            dir: dir.into(),
            selectors,
        }
    }

    pub fn page_path(&self, page: u32) -> PathBuf {
        self.dir.join(format!("page-{page}.html"))
    }
}

#[async_trait]
impl Fetcher for SnapshotFetcher {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<RawFragment>, FetchError> {
        let path = self.page_path(page);
        info!("Reading rendered listing page {page}: {}", path.display());
        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })?;
        Ok(parse_listing_html(&html, &self.selectors))
    }
}
