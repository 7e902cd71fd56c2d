use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use parking_lot::Mutex;
use tokio::sync::watch;
use url::Url;

use crate::crawl::barrier::LayerBarrier;
use crate::crawl::config::CrawlerConfig;
use crate::crawl::errors::CrawlError;
use crate::crawl::host_gate::{Admission, HostGate};
use crate::crawl::tracker::VisitTracker;
use crate::downloaders::{Downloader, Page};
use crate::pool::{Job, WorkerPool};
use crate::stats::StatsTracker;

/// Runs one breadth-first layer at a time: a download job per URL, admitted
/// through that URL's host gate, with link extraction chained onto
/// successful downloads while crawl depth remains.
pub(crate) struct LayerScheduler {
    downloader: Arc<dyn Downloader>,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    per_host: usize,
    hosts: Mutex<HashMap<String, Arc<HostGate>>>,
    stats: Arc<StatsTracker>,
    shutdown: watch::Receiver<bool>,
}

/// State shared by every job belonging to one layer.
struct LayerCtx {
    downloader: Arc<dyn Downloader>,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    tracker: Arc<VisitTracker>,
    barrier: LayerBarrier,
    next_layer: Mutex<Vec<String>>,
    stats: Arc<StatsTracker>,
    remaining: usize,
}

impl LayerScheduler {
    pub(crate) fn new(
        downloader: Arc<dyn Downloader>,
        config: &CrawlerConfig,
        stats: Arc<StatsTracker>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            downloader,
            download_pool: Arc::new(WorkerPool::new("download", config.download_workers)),
            extract_pool: Arc::new(WorkerPool::new("extract", config.extract_workers)),
            per_host: config.per_host,
            hosts: Mutex::new(HashMap::new()),
            stats,
            shutdown,
        }
    }

    /// Processes one layer and returns the next one. Blocks until every URL
    /// of the layer has finished all of its work, downloads and chained
    /// extraction included, or until shutdown is requested.
    pub(crate) async fn process(
        &self,
        layer: Vec<String>,
        tracker: &Arc<VisitTracker>,
        remaining: usize,
    ) -> Vec<String> {
        debug!(
            "processing layer of {} urls, {} levels remaining",
            layer.len(),
            remaining
        );
        self.stats.record_layer();

        let ctx = Arc::new(LayerCtx {
            downloader: Arc::clone(&self.downloader),
            download_pool: Arc::clone(&self.download_pool),
            extract_pool: Arc::clone(&self.extract_pool),
            tracker: Arc::clone(tracker),
            barrier: LayerBarrier::new(layer.len()),
            next_layer: Mutex::new(Vec::new()),
            stats: Arc::clone(&self.stats),
            remaining,
        });

        for url in layer {
            let host = match host_of(&url) {
                Ok(host) => host,
                Err(err) => {
                    // Never reaches a gate or pool, but still owes the
                    // barrier its one arrival.
                    debug!("cannot resolve host of {url}: {err}");
                    tracker.record_error(&url, err);
                    ctx.barrier.arrive();
                    continue;
                }
            };
            let gate = self.gate_for(&host);
            let job = download_job(Arc::clone(&ctx), Arc::clone(&gate), url);
            if let Admission::Admit(job) = gate.offer(job) {
                self.download_pool.submit(job);
            }
        }

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = ctx.barrier.wait() => {}
            _ = shutdown.wait_for(|stop| *stop) => {
                warn!("shutdown requested, abandoning the rest of the layer");
            }
        }
        let next_layer = std::mem::take(&mut *ctx.next_layer.lock());
        next_layer
    }

    pub(crate) async fn close(&self, grace: Duration) {
        self.download_pool.shutdown(grace).await;
        self.extract_pool.shutdown(grace).await;
    }

    fn gate_for(&self, host: &str) -> Arc<HostGate> {
        let mut hosts = self.hosts.lock();
        Arc::clone(
            hosts
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(HostGate::new(self.per_host))),
        )
    }
}

fn host_of(url: &str) -> Result<String, CrawlError> {
    let parsed = Url::parse(url).map_err(|err| CrawlError::InvalidUrl(err.to_string()))?;
    parsed
        .host_str()
        .map(str::to_owned)
        .ok_or_else(|| CrawlError::InvalidUrl(format!("no host in {url}")))
}

fn download_job(ctx: Arc<LayerCtx>, gate: Arc<HostGate>, url: String) -> Job {
    Box::pin(async move {
        trace!("downloading {url}");
        match ctx.downloader.fetch(&url).await {
            Ok(page) => {
                ctx.tracker.record_success(&url);
                ctx.stats.record_fetch();
                if ctx.remaining > 1 {
                    let extract = extract_job(Arc::clone(&ctx), url, page);
                    ctx.extract_pool.submit(extract);
                } else {
                    ctx.barrier.arrive();
                }
            }
            Err(err) => {
                debug!("download of {url} failed: {err}");
                ctx.stats.record_failure();
                ctx.tracker
                    .record_error(&url, CrawlError::Download(err.to_string()));
                ctx.barrier.arrive();
            }
        }
        // The permit moves on as soon as the download attempt resolves;
        // extraction keeps running without holding it.
        if let Some(next) = gate.release() {
            ctx.download_pool.submit(next);
        }
    })
}

fn extract_job(ctx: Arc<LayerCtx>, url: String, page: Box<dyn Page>) -> Job {
    Box::pin(async move {
        match page.extract_links() {
            Ok(links) => {
                let mut fresh = 0usize;
                for link in links {
                    if ctx.tracker.try_visit(&link) {
                        ctx.next_layer.lock().push(link);
                        fresh += 1;
                    }
                }
                ctx.stats.record_links(fresh);
                trace!("{url}: {fresh} new links");
            }
            // A page stays downloaded even when its links cannot be parsed.
            Err(err) => debug!("discarding link extraction failure for {url}: {err}"),
        }
        ctx.barrier.arrive();
    })
}
