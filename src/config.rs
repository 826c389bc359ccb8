use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::{
    error::FetchError, fetcher::ListingSelectors, report::ReportFormat, store::KEYWORD_DELIMITER,
};

/// Upper bound on `PIB_PAGE_COUNT`; the listing is walked one page at a time.
pub const MAX_PAGE_COUNT: u32 = 50;

const ENV_PREFIX: &str = "PIB_";

fn default_listing_url() -> String {
    "https://www.pib.gov.in/allRel.aspx?lang=1&reg=38&page={page}".to_string()
}
fn default_base_url() -> String {
    "https://www.pib.gov.in".to_string()
}
fn default_page_count() -> u32 {
    3
}
fn default_ministries() -> String {
    [
        "Ministry of Power",
        "Ministry of New and Renewable Energy",
        "Ministry of Coal",
        "Ministry of Petroleum & Natural Gas",
        "Ministry of Environment, Forest and Climate Change",
    ]
    .join(";")
}
fn default_keywords() -> String {
    [
        "solar", "wind", "renewable", "power", "energy", "electricity", "grid", "hydrogen",
        "battery", "coal", "climate",
    ]
    .join(";")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("press_releases.csv")
}
fn default_new_items_path() -> PathBuf {
    PathBuf::from("new_press_releases.csv")
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_item_selector() -> String {
    "ul.num li".to_string()
}
fn default_title_selector() -> String {
    "a".to_string()
}
fn default_date_selector() -> String {
    ".publishdatesmall, .date".to_string()
}
fn default_ministry_selector() -> String {
    ".ministry, .font104".to_string()
}
fn default_link_filter() -> String {
    "/PressReleasePage.aspx".to_string()
}

/// The `PIB_*` env vars. Everything has a default, so an empty environment
/// tracks the PIB all-releases listing.
#[derive(Debug, Deserialize)]
pub struct TrackerEnv {
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    // `;`-separated: ministry names contain commas.
    #[serde(default = "default_ministries")]
    pub ministries: String,
    #[serde(default = "default_keywords")]
    pub keywords: String,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_new_items_path")]
    pub new_items_path: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_item_selector")]
    pub item_selector: String,
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    #[serde(default = "default_date_selector")]
    pub date_selector: String,
    #[serde(default = "default_ministry_selector")]
    pub ministry_selector: String,
    // Empty disables link filtering.
    #[serde(default = "default_link_filter")]
    pub link_filter: String,
    #[serde(default)]
    pub report_format: ReportFormat,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub listing_url: String,
    pub base_url: Url,
    pub page_count: u32,
    pub ministries: Vec<String>,
    pub keywords: Vec<String>,
    pub store_path: PathBuf,
    pub new_items_path: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub selectors: ListingSelectors,
    pub report_format: ReportFormat,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_selector(css: &str, what: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid {what} selector {css:?}: {e}"))
}

impl TrackerConfig {
    pub fn new() -> anyhow::Result<Self> {
        let env = TrackerEnv::load_from_env()?;
        Self::from_env(env)
    }

    pub fn from_env(env: TrackerEnv) -> anyhow::Result<Self> {
        let base_url = Url::parse(&env.base_url)
            .with_context(|| format!("invalid base url: {}", env.base_url))?;

        if env.page_count > MAX_PAGE_COUNT {
            bail!(
                "page count {} exceeds the maximum of {MAX_PAGE_COUNT}",
                env.page_count
            );
        }

        let ministries = split_list(&env.ministries);
        if ministries.is_empty() {
            bail!("no target ministries configured");
        }
        let keywords = split_list(&env.keywords);
        if keywords.is_empty() {
            bail!("no keywords configured");
        }
        // The store keeps matched keywords in one cell joined by the delimiter.
        if let Some(keyword) = keywords.iter().find(|k| k.contains(KEYWORD_DELIMITER)) {
            bail!(
                "keyword {keyword:?} contains the stored keyword separator {KEYWORD_DELIMITER:?}"
            );
        }

        let selectors = ListingSelectors {
            item: parse_selector(&env.item_selector, "item")?,
            title: parse_selector(&env.title_selector, "title")?,
            date: parse_selector(&env.date_selector, "date")?,
            ministry: parse_selector(&env.ministry_selector, "ministry")?,
            link_filter: Some(env.link_filter.trim().to_string()).filter(|f| !f.is_empty()),
        };

        Ok(Self {
            listing_url: env.listing_url,
            base_url,
            page_count: env.page_count,
            ministries,
            keywords,
            store_path: env.store_path,
            new_items_path: env.new_items_path,
            snapshot_dir: env.snapshot_dir,
            request_timeout: Duration::from_secs(env.request_timeout_secs),
            selectors,
            report_format: env.report_format,
        })
    }
}

/// Builds the URL of each listing page from a template.
#[derive(Debug, Clone)]
pub struct ListingUrlBuilder {
    template: String,
    // Matches the `{page}` placeholder in the template.
    page_placeholder: Regex,
}

impl ListingUrlBuilder {
    pub fn new(template: &str) -> anyhow::Result<Self> {
        let page_placeholder = Regex::new(r"\{page\}")?;
        Ok(Self {
            template: template.to_string(),
            page_placeholder,
        })
    }

    /// `{page}` is replaced by the page number. Templates without it get a
    /// `page=<n>` query pair for every page after the first.
    pub fn page_url(&self, page: u32) -> Result<Url, FetchError> {
        let invalid =
            |e: url::ParseError| FetchError::InvalidUrl(format!("{}: {e}", self.template));

        if self.page_placeholder.is_match(&self.template) {
            let raw = self
                .page_placeholder
                .replace_all(&self.template, page.to_string().as_str());
            return Url::parse(&raw).map_err(invalid);
        }

        let mut url = Url::parse(&self.template).map_err(invalid)?;
        if page > 1 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        Ok(url)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> TrackerEnv {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter(vars).unwrap()
    }

    #[test]
    fn empty_env_uses_defaults() {
        let config = TrackerConfig::from_env(env_from(&[])).unwrap();
        assert_eq!(config.page_count, 3);
        assert_eq!(config.base_url.as_str(), "https://www.pib.gov.in/");
        assert!(config.ministries.contains(&"Ministry of Power".to_string()));
        assert!(config
            .ministries
            .contains(&"Ministry of Environment, Forest and Climate Change".to_string()));
        assert!(config.keywords.contains(&"solar".to_string()));
        assert_eq!(config.store_path, PathBuf::from("press_releases.csv"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.selectors.link_filter.as_deref(),
            Some("/PressReleasePage.aspx")
        );
        assert_eq!(config.report_format, ReportFormat::Table);
    }

    #[test]
    fn lists_are_semicolon_separated() {
        let config = TrackerConfig::from_env(env_from(&[
            ("ministries", " Ministry of Power ; Ministry of Coal;;"),
            ("keywords", "solar;wind"),
            ("page_count", "4"),
            ("link_filter", ""),
        ]))
        .unwrap();
        assert_eq!(config.ministries, ["Ministry of Power", "Ministry of Coal"]);
        assert_eq!(config.keywords, ["solar", "wind"]);
        assert_eq!(config.page_count, 4);
        assert!(config.selectors.link_filter.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(TrackerConfig::from_env(env_from(&[("page_count", "500")])).is_err());
        assert!(TrackerConfig::from_env(env_from(&[("base_url", "not a url")])).is_err());
        assert!(TrackerConfig::from_env(env_from(&[("keywords", " ; ")])).is_err());
        assert!(TrackerConfig::from_env(env_from(&[("item_selector", "li[")])).is_err());
    }

    #[test]
    fn rejects_keyword_containing_store_separator() {
        let err = TrackerConfig::from_env(env_from(&[("keywords", "solar;power, grid")]))
            .unwrap_err();
        assert!(err.to_string().contains("power, grid"));

        // A bare comma is fine, only the joined form is reserved.
        let config =
            TrackerConfig::from_env(env_from(&[("keywords", "solar;power,grid")])).unwrap();
        assert_eq!(config.keywords, ["solar", "power,grid"]);
    }

    #[test]
    fn substitutes_page_placeholder() {
        let urls = ListingUrlBuilder::new("https://example.gov/list?p={page}&lang=1").unwrap();
        assert_eq!(
            urls.page_url(3).unwrap().as_str(),
            "https://example.gov/list?p=3&lang=1"
        );
    }

    #[test]
    fn appends_page_query_without_placeholder() {
        let urls = ListingUrlBuilder::new("https://example.gov/list?lang=1").unwrap();
        assert_eq!(
            urls.page_url(1).unwrap().as_str(),
            "https://example.gov/list?lang=1"
        );
        assert_eq!(
            urls.page_url(2).unwrap().as_str(),
            "https://example.gov/list?lang=1&page=2"
        );
        assert!(matches!(
            ListingUrlBuilder::new("nowhere").unwrap().page_url(1),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
