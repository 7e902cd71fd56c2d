use std::time::Duration;

/// Crawler sizing, fixed at construction.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub download_workers: usize,
    pub extract_workers: usize,
    pub per_host: usize,
    pub shutdown_grace: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            download_workers: 10,
            extract_workers: 10,
            per_host: 5,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

impl CrawlerConfig {
    pub fn with_download_workers(mut self, count: usize) -> Self {
        self.download_workers = count.max(1);
        self
    }

    pub fn with_extract_workers(mut self, count: usize) -> Self {
        self.extract_workers = count.max(1);
        self
    }

    pub fn with_per_host(mut self, limit: usize) -> Self {
        self.per_host = limit.max(1);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}
