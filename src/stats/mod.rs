use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_downloaded: usize,
    pub pages_failed: usize,
    pub links_discovered: usize,
    pub layers_processed: usize,
}

#[derive(Debug)]
pub struct StatsTracker {
    stats: RwLock<CrawlStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: RwLock::new(CrawlStats {
                start_time: Utc::now(),
                end_time: None,
                pages_downloaded: 0,
                pages_failed: 0,
                links_discovered: 0,
                layers_processed: 0,
            }),
        }
    }

    pub fn record_fetch(&self) {
        self.stats.write().pages_downloaded += 1;
    }

    pub fn record_failure(&self) {
        self.stats.write().pages_failed += 1;
    }

    pub fn record_links(&self, count: usize) {
        self.stats.write().links_discovered += count;
    }

    pub fn record_layer(&self) {
        self.stats.write().layers_processed += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> CrawlStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nCrawl Statistics:");
        println!("=================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("Pages Downloaded: {}", stats.pages_downloaded);
        println!("Pages Failed: {}", stats.pages_failed);
        println!("Links Discovered: {}", stats.links_discovered);
        println!("Layers Processed: {}", stats.layers_processed);
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
