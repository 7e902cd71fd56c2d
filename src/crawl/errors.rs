use serde::Serialize;
use thiserror::Error;

/// Per-URL failure recorded in the crawl result. A URL with one of these
/// never makes it into the downloaded set.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum CrawlError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("download failed: {0}")]
    Download(String),
}

/// Failure reported by a downloader fetch attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Failure while pulling links out of an already-downloaded page. The page
/// itself still counts as downloaded.
#[derive(Debug, Error)]
#[error("link extraction failed: {0}")]
pub struct ExtractError(pub String);
