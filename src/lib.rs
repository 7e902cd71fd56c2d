pub mod crawl;
pub mod downloaders;
pub mod pool;
pub mod stats;

pub use crawl::{CrawlError, CrawlResult, Crawler, CrawlerConfig, DownloadError, ExtractError};
pub use downloaders::{Downloader, HttpDownloader, MockDownloader, Page};
pub use stats::StatsTracker;
