use std::path::PathBuf;

/// Failure to retrieve one listing page. Only that page's contribution is lost.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page url: {0}")]
    InvalidUrl(String),
}

/// A listing fragment that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("fragment has no {0}")]
    MissingField(&'static str),

    #[error("cannot resolve link {href:?}: {reason}")]
    InvalidLink { href: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file: {0}")]
    Csv(#[from] csv::Error),
}

/// Run-level failures. Everything below page granularity is absorbed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("all {pages} listing pages failed to fetch")]
    AllPagesFailed { pages: u32 },
}
