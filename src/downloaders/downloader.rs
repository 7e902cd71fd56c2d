use async_trait::async_trait;

use crate::crawl::{DownloadError, ExtractError};

/// The fetch capability the crawler is built around. Implementations may
/// block the calling pool slot; failures surface as [`DownloadError`].
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, DownloadError>;
}

/// A successfully downloaded page. Link extraction is a pure read over the
/// already-fetched content.
pub trait Page: Send + Sync + std::fmt::Debug {
    fn url(&self) -> &str;
    fn extract_links(&self) -> Result<Vec<String>, ExtractError>;
}
