pub mod collector;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod reconciler;
pub mod relevance;
pub mod report;
pub mod requests;
pub mod scraping_context;
pub mod store;
mod text_manipulators;

pub use error::{ExtractionError, FetchError, PipelineError, StoreError};
pub use extractor::ListingRecord;
pub use fetcher::{Fetcher, HttpFetcher, RawFragment, SnapshotFetcher};
pub use pipeline::{RunReport, run};
pub use reconciler::{RecordSet, reconcile};
pub use relevance::RelevanceFilter;
pub use store::{CsvStore, Store};
