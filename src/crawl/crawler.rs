use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use crate::crawl::config::CrawlerConfig;
use crate::crawl::scheduler::LayerScheduler;
use crate::crawl::tracker::{CrawlResult, VisitTracker};
use crate::downloaders::Downloader;
use crate::stats::StatsTracker;

/// Breadth-first crawler over an injected [`Downloader`].
///
/// The worker pools and the per-host gates live as long as the crawler, so
/// host limits keep applying across repeated [`Crawler::crawl`] calls.
pub struct Crawler {
    scheduler: LayerScheduler,
    config: CrawlerConfig,
    stats: Arc<StatsTracker>,
    shutdown: watch::Sender<bool>,
}

impl Crawler {
    pub fn new(downloader: Arc<dyn Downloader>, config: CrawlerConfig) -> Self {
        info!(
            "initializing crawler ({} download workers, {} extract workers, {} per host)",
            config.download_workers, config.extract_workers, config.per_host
        );
        let stats = Arc::new(StatsTracker::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let scheduler =
            LayerScheduler::new(downloader, &config, Arc::clone(&stats), shutdown_rx);
        Self {
            scheduler,
            config,
            stats,
            shutdown,
        }
    }

    /// Crawls breadth-first from `seed`, following links over `depth`
    /// levels, the seed's own level included. Per-URL failures become part
    /// of the result instead of failing the crawl.
    pub async fn crawl(&self, seed: &str, depth: usize) -> CrawlResult {
        info!("crawling {seed} to depth {depth}");
        let tracker = Arc::new(VisitTracker::new());
        tracker.try_visit(seed);

        let mut layer = vec![seed.to_string()];
        for level in 0..depth {
            if layer.is_empty() {
                debug!("layer {level} is empty, stopping early");
                break;
            }
            layer = self.scheduler.process(layer, &tracker, depth - level).await;
        }
        tracker.snapshot()
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Idempotent. Stops accepting work, drains the pools within the
    /// configured grace period, then aborts whatever is left. A crawl still
    /// in flight returns the partial result it accumulated so far.
    pub async fn shutdown(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        self.scheduler.close(self.config.shutdown_grace).await;
        self.stats.finish();
        info!("crawler shut down");
    }
}
